//! Wire messages of `materials.MaterialsService`.
//!
//! Kept in step with `proto/materials.proto` by hand.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Material {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub owner_uuid: String,
    #[prost(string, tag = "3")]
    pub title: String,
    #[prost(string, tag = "4")]
    pub cover_image_url: String,
    #[prost(string, tag = "5")]
    pub description: String,
    #[prost(string, optional, tag = "6")]
    pub content: Option<String>,
    #[prost(int32, tag = "7")]
    pub read_time_minutes: i32,
    #[prost(string, tag = "8")]
    pub status: String,
    #[prost(string, tag = "9")]
    pub created_at: String,
    #[prost(string, optional, tag = "10")]
    pub edited_at: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub published_at: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub archived_at: Option<String>,
    #[prost(int32, tag = "13")]
    pub likes_count: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SaveDraftMaterialIn {
    #[prost(string, tag = "1")]
    pub title: String,
    #[prost(string, optional, tag = "2")]
    pub content: Option<String>,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub cover_image_url: String,
    #[prost(int32, tag = "5")]
    pub read_time_minutes: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SaveDraftMaterialOut {
    #[prost(string, tag = "1")]
    pub uuid: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishMaterialIn {
    #[prost(string, tag = "1")]
    pub uuid: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PublishMaterialOut {
    #[prost(message, optional, tag = "1")]
    pub material: Option<Material>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EditMaterialIn {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, optional, tag = "3")]
    pub content: Option<String>,
    #[prost(string, tag = "4")]
    pub description: String,
    #[prost(string, tag = "5")]
    pub cover_image_url: String,
    #[prost(int32, tag = "6")]
    pub read_time_minutes: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EditMaterialOut {
    #[prost(message, optional, tag = "1")]
    pub material: Option<Material>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ToggleLikeIn {
    #[prost(string, tag = "1")]
    pub material_uuid: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ToggleLikeOut {
    #[prost(bool, tag = "1")]
    pub is_liked: bool,
    #[prost(int32, tag = "2")]
    pub likes_count: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArchivedMaterialIn {
    #[prost(string, tag = "1")]
    pub uuid: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ArchivedMaterialOut {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteMaterialIn {
    #[prost(string, tag = "1")]
    pub uuid: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DeleteMaterialOut {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetAllMaterialsIn {
    #[prost(int64, tag = "1")]
    pub page: i64,
    #[prost(int64, tag = "2")]
    pub limit: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAllMaterialsOut {
    #[prost(message, repeated, tag = "1")]
    pub material_list: Vec<Material>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMaterialIn {
    #[prost(string, tag = "1")]
    pub material_uuid: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMaterialOut {
    #[prost(message, optional, tag = "1")]
    pub material: Option<Material>,
}
