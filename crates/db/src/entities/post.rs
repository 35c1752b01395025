//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner user ID. Immutable after creation.
    #[sea_orm(indexed)]
    pub user_id: String,

    pub title: String,

    /// Free text; the segment after the last comma is treated as a city
    /// for statistics.
    pub location: String,

    #[sea_orm(column_type = "Text")]
    pub review: String,

    /// Rating, 1 to 5.
    pub rating: i32,

    /// When the meal was eaten, as supplied by the user.
    #[sea_orm(indexed)]
    pub eaten_at: DateTimeWithTimeZone,

    /// Hosted image URL, empty when no photo was uploaded.
    pub image: String,

    /// Approval gate: the post is publicly visible only when true.
    /// Flipped only by the admin status endpoint; reset on every edit.
    pub is_approved: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::bookmark::Entity")]
    Bookmarks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::bookmark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmarks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
