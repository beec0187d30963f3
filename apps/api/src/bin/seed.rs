//! Development seed data.
//!
//! Wipes the database named by `DATABASE_URL` and inserts an admin user,
//! three customers and four invoices.
//!
//! ```text
//! cargo run -p invoice-api --bin seed
//! ```

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use invoice_api::auth::hash_password;
use invoice_api::AppConfig;
use invoice_core::types::parse_date;
use invoice_core::{CreateCustomer, CreateInvoice, InvoiceItemInput, InvoiceStatus, Money};
use invoice_db::{Database, DbConfig};

struct SeedInvoice {
    customer: usize,
    number: &'static str,
    date: &'static str,
    due_date: &'static str,
    status: InvoiceStatus,
    items: &'static [(&'static str, i64, i64)],
}

const CUSTOMERS: [(&str, &str, &str, &str); 3] = [
    (
        "Acme Corporation",
        "contact@acme.com",
        "TAX-001-ACME",
        "123 Business St, New York, NY 10001",
    ),
    (
        "Tech Solutions Inc",
        "info@techsolutions.com",
        "TAX-002-TECH",
        "456 Innovation Ave, San Francisco, CA 94105",
    ),
    (
        "Global Traders LLC",
        "admin@globaltraders.com",
        "TAX-003-GLOBAL",
        "789 Commerce Blvd, Chicago, IL 60601",
    ),
];

// (description, quantity, unit price in cents)
const INVOICES: [SeedInvoice; 4] = [
    SeedInvoice {
        customer: 0,
        number: "INV-2024-001",
        date: "2024-01-15",
        due_date: "2024-02-15",
        status: InvoiceStatus::Paid,
        items: &[
            ("Web Development Services", 40, 2_500),
            ("Hosting & Maintenance", 1, 50_000),
        ],
    },
    SeedInvoice {
        customer: 1,
        number: "INV-2024-002",
        date: "2024-02-01",
        due_date: "2024-03-01",
        status: InvoiceStatus::Sent,
        items: &[
            ("Software License - Enterprise", 10, 20_000),
            ("Technical Support - Annual", 1, 120_000),
        ],
    },
    SeedInvoice {
        customer: 0,
        number: "INV-2024-003",
        date: "2024-02-10",
        due_date: "2024-03-10",
        status: InvoiceStatus::Draft,
        items: &[
            ("UI/UX Design Consultation", 10, 7_500),
            ("Design Assets Package", 1, 10_000),
        ],
    },
    SeedInvoice {
        customer: 2,
        number: "INV-2024-004",
        date: "2024-02-15",
        due_date: "2024-03-15",
        status: InvoiceStatus::Sent,
        items: &[("Database Migration Service", 24, 10_000)],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(db_url = %config.database_url, "Starting database seed...");

    let db = Database::new(DbConfig::new(&config.database_url))
        .await
        .context("failed to open database")?;

    db.clear_all().await?;

    let hash = hash_password("admin123")?;
    let admin = db
        .users()
        .insert("admin@example.com", &hash, "Admin User")
        .await?;
    info!(email = %admin.email, "Created admin user");

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email, tax_number, address) in CUSTOMERS {
        let customer = db
            .customers()
            .insert(&CreateCustomer {
                name: name.to_string(),
                email: email.to_string(),
                tax_number: Some(tax_number.to_string()),
                address: Some(address.to_string()),
            })
            .await?;
        info!(id = %customer.id, name = %customer.name, "Created customer");
        customer_ids.push(customer.id);
    }

    for seed in &INVOICES {
        let items: Vec<InvoiceItemInput> = seed
            .items
            .iter()
            .map(|(description, quantity, unit_cents)| {
                let unit_price = Money::from_cents(*unit_cents);
                InvoiceItemInput {
                    description: description.to_string(),
                    quantity: *quantity,
                    unit_price,
                    total: unit_price.multiply_quantity(*quantity),
                }
            })
            .collect();

        let invoice = db
            .invoices()
            .create(&CreateInvoice {
                customer_id: customer_ids[seed.customer].clone(),
                number: seed.number.to_string(),
                date: parse_date(seed.date)?,
                due_date: parse_date(seed.due_date)?,
                status: Some(seed.status),
                total_amount: items.iter().map(|item| item.total).sum(),
                items,
            })
            .await?;

        info!(
            number = %invoice.invoice.number,
            total = %invoice.invoice.total_amount,
            "Created invoice"
        );
    }

    db.close().await;
    info!("Database seed completed successfully!");
    Ok(())
}
