//! `SeaORM` Entity for expenses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uid: Uuid,
    #[sea_orm(unique)]
    pub serial_no: Option<String>,
    pub title: String,
    pub description: String,
    pub note: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_spent: Decimal,
    pub budget_uid: Uuid,
    pub category_uid: Uuid,
    pub user_uid: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetUid",
        to = "super::budgets::Column::Uid",
        on_delete = "Cascade"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::expense_categories::Entity",
        from = "Column::CategoryUid",
        to = "super::expense_categories::Column::Uid"
    )]
    ExpenseCategories,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserUid",
        to = "super::users::Column::Uid"
    )]
    Users,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::expense_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseCategories.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
