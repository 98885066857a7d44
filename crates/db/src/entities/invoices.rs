//! `SeaORM` Entity for invoices table.
//!
//! Settlement figures (tax, discount, total, net due, payment status) are
//! never stored here; they are derived from `gross_amount`, the percent
//! columns, and the payment ledger on every read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uid: Uuid,
    #[sea_orm(unique)]
    pub serial_no: Option<String>,
    pub title: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub gross_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub tax_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_percent: Decimal,
    pub invoice_type: InvoiceType,
    pub invoiced_at: Option<DateTimeWithTimeZone>,
    pub department_uid: Option<Uuid>,
    pub service_uid: Option<Uuid>,
    pub patient_uid: Option<Uuid>,
    pub user_uid: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserUid",
        to = "super::users::Column::Uid"
    )]
    Users,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
