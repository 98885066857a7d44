//! Database seeder for Curafin development and testing.
//!
//! Seeds users, departments, expense categories, and a small sample
//! ledger (one approved budget with expenses, one invoice with a payment)
//! for local development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use curafin_core::auth::hash_password;
use curafin_db::entities::{
    budgets, departments, expense_categories,
    sea_orm_active_enums::{InvoiceType, PaymentMethod, RecordStatus, UserRole},
    users,
};
use curafin_db::repositories::{
    CreateBudgetInput, CreateExpenseInput, CreateInvoiceInput, CreatePaymentInput,
};
use curafin_db::{BudgetRepository, Caller, InvoiceRepository};

/// Admin user ID (consistent for all seeds)
const ADMIN_USER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Staff user ID (consistent for all seeds)
const STAFF_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = curafin_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding departments...");
    seed_departments(&db).await;

    println!("Seeding expense categories...");
    seed_expense_categories(&db).await;

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding sample ledger...");
    seed_sample_ledger(&db).await;

    println!("Seeding complete!");
}

fn admin_user_id() -> Uuid {
    Uuid::parse_str(ADMIN_USER_ID).unwrap()
}

fn staff_user_id() -> Uuid {
    Uuid::parse_str(STAFF_USER_ID).unwrap()
}

/// Looks up a department by its unique name.
async fn department_by_name(db: &DatabaseConnection, name: &str) -> Option<departments::Model> {
    departments::Entity::find()
        .filter(departments::Column::Name.eq(name))
        .one(db)
        .await
        .ok()
        .flatten()
}

/// Seeds the department reference data.
async fn seed_departments(db: &DatabaseConnection) {
    let names = [
        "Finance",
        "General Medicine",
        "Radiology",
        "Pharmacy",
        "Operations",
    ];

    let mut inserted = 0;
    for name in names {
        let department = departments::ActiveModel {
            uid: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set(RecordStatus::Active),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = department.insert(db).await {
            // Ignore duplicate key errors (department already exists)
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert department {name}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} departments");
}

/// Seeds the expense category reference data.
async fn seed_expense_categories(db: &DatabaseConnection) {
    let names = [
        "Medical Supplies",
        "Office Supplies",
        "Equipment Maintenance",
        "Utilities",
        "Travel",
        "Training",
    ];

    let mut inserted = 0;
    for name in names {
        let category = expense_categories::ActiveModel {
            uid: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set(RecordStatus::Active),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = category.insert(db).await {
            if !e.to_string().contains("duplicate key") {
                eprintln!("Failed to insert expense category {name}: {e}");
            }
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} expense categories");
}

/// Seeds one admin and one staff user with working passwords.
async fn seed_users(db: &DatabaseConnection) {
    let finance = department_by_name(db, "Finance").await;

    let accounts = [
        (
            admin_user_id(),
            "admin@curafin.dev",
            "admin12345",
            "Curafin Admin",
            UserRole::Admin,
            None,
        ),
        (
            staff_user_id(),
            "staff@curafin.dev",
            "staff12345",
            "Curafin Staff",
            UserRole::Staff,
            finance.map(|d| d.uid),
        ),
    ];

    for (uid, email, password, full_name, role, department_uid) in accounts {
        if users::Entity::find_by_id(uid)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let password_hash = hash_password(password).expect("Failed to hash seed password");
        let user = users::ActiveModel {
            uid: Set(uid),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            full_name: Set(full_name.to_string()),
            role: Set(role),
            department_uid: Set(department_uid),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {email}: {e}");
        } else {
            println!("  Created user: {email} (password: {password})");
        }
    }
}

/// Seeds one approved budget with expenses and one invoice with a payment.
///
/// Goes through the repositories so serial numbers and the remaining
/// amount are assigned exactly as they are in production.
async fn seed_sample_ledger(db: &DatabaseConnection) {
    // A single existing budget means the ledger was already seeded
    if budgets::Entity::find()
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Sample ledger already exists, skipping...");
        return;
    }

    let Some(finance) = department_by_name(db, "Finance").await else {
        eprintln!("Finance department missing; skipping sample ledger");
        return;
    };
    let Some(supplies) = expense_categories::Entity::find()
        .filter(expense_categories::Column::Name.eq("Medical Supplies"))
        .one(db)
        .await
        .ok()
        .flatten()
    else {
        eprintln!("Medical Supplies category missing; skipping sample ledger");
        return;
    };

    let admin = Caller {
        user_uid: admin_user_id(),
        admin: true,
    };

    let budget_repo = BudgetRepository::new(db.clone());
    let budget = match budget_repo
        .create_budget(
            &admin,
            CreateBudgetInput {
                department_uid: finance.uid,
                gross_amount: dec!(25000.00),
                title: "Q3 operating budget".to_string(),
                description: "Quarterly allocation for day-to-day operations".to_string(),
                received_at: None,
                assignee_uid: Some(staff_user_id()),
            },
        )
        .await
    {
        Ok(budget) => budget,
        Err(e) => {
            eprintln!("Failed to seed budget: {e}");
            return;
        }
    };
    println!(
        "  Created budget {} ({})",
        budget.title,
        budget.serial_no.as_deref().unwrap_or("-")
    );

    let expense_seeds = [
        ("Gauze and dressings restock", dec!(1250.00)),
        ("Sterile gloves", dec!(480.50)),
    ];
    for (title, amount) in expense_seeds {
        match budget_repo
            .add_expense(
                &admin,
                budget.uid,
                CreateExpenseInput {
                    category_uid: supplies.uid,
                    amount_spent: amount,
                    title: title.to_string(),
                    description: String::new(),
                    note: None,
                },
            )
            .await
        {
            Ok(expense) => println!(
                "  Created expense {} ({})",
                expense.title,
                expense.serial_no.as_deref().unwrap_or("-")
            ),
            Err(e) => eprintln!("Failed to seed expense {title}: {e}"),
        }
    }

    let invoice_repo = InvoiceRepository::new(db.clone());
    let invoice = match invoice_repo
        .create_invoice(
            &admin,
            CreateInvoiceInput {
                title: "Radiology imaging package".to_string(),
                gross_amount: dec!(1800.00),
                tax_percent: dec!(11.00),
                discount_percent: dec!(5.00),
                invoice_type: InvoiceType::Service,
                invoiced_at: None,
                department_uid: department_by_name(db, "Radiology").await.map(|d| d.uid),
                service_uid: None,
                patient_uid: None,
            },
        )
        .await
    {
        Ok(invoice) => invoice,
        Err(e) => {
            eprintln!("Failed to seed invoice: {e}");
            return;
        }
    };
    println!(
        "  Created invoice {} ({})",
        invoice.title,
        invoice.serial_no.as_deref().unwrap_or("-")
    );

    match invoice_repo
        .add_payment(
            &admin,
            invoice.uid,
            CreatePaymentInput {
                amount_received: dec!(900.00),
                payment_method: PaymentMethod::BankTransfer,
                reference_number: "TRX-SEED-0001".to_string(),
                note: Some("First installment".to_string()),
                received_at: None,
            },
        )
        .await
    {
        Ok(payment) => println!(
            "  Created payment {} ({})",
            payment.reference_number,
            payment.serial_no.as_deref().unwrap_or("-")
        ),
        Err(e) => eprintln!("Failed to seed payment: {e}"),
    }
}
