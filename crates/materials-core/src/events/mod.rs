//! Domain events - produced on committed material changes, consumed from the
//! identity and media services

mod consumed;
mod material_event;

pub use consumed::{AvatarUpdatedEvent, NicknameUpdatedEvent, UserCreatedEvent};
pub use material_event::{
    MaterialCreatedEvent, MaterialDeletedEvent, MaterialEditedEvent, MaterialEvent,
    MaterialEventKind, MaterialLikeToggledEvent,
};
