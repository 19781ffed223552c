//! Database seeder for Rebar development and testing.
//!
//! Seeds a demo organization with one user per role, a project with
//! line items, and a small material catalog.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use rebar_core::auth::hash_password;
use rebar_db::entities::{
    line_items, materials, organization_users, organizations, projects,
    sea_orm_active_enums::{ProjectStatus, UserRole},
    users,
};

/// Demo organization ID (consistent for all seeds)
const DEMO_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo admin user ID
const DEMO_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo team leader user ID
const DEMO_LEADER_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo site user ID
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000004";
/// Demo project ID
const DEMO_PROJECT_ID: &str = "00000000-0000-0000-0000-000000000010";

/// Password shared by all demo accounts.
const DEMO_PASSWORD: &str = "rebar-demo";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = rebar_db::connect(&database_url, 5, 1)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo organization...");
    seed_organization(&db).await;

    println!("Seeding demo users...");
    seed_users(&db).await;

    println!("Seeding demo project...");
    seed_project(&db).await;

    println!("Seeding line items...");
    seed_line_items(&db).await;

    println!("Seeding material catalog...");
    seed_materials(&db).await;

    println!("Seeding complete!");
    println!("  Accounts: admin@rebar.dev, leader@rebar.dev, site@rebar.dev");
    println!("  Password: {DEMO_PASSWORD}");
}

fn id(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

async fn seed_organization(db: &DatabaseConnection) {
    if organizations::Entity::find_by_id(id(DEMO_ORG_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo organization already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let org = organizations::ActiveModel {
        id: Set(id(DEMO_ORG_ID)),
        name: Set("Demo Construction Co".to_string()),
        slug: Set("demo-construction".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = org.insert(db).await {
        eprintln!("Failed to insert demo organization: {e}");
    } else {
        println!("  Created organization: demo-construction");
    }
}

async fn seed_users(db: &DatabaseConnection) {
    let accounts = [
        (DEMO_ADMIN_ID, "admin@rebar.dev", "Demo Admin", UserRole::Admin),
        (
            DEMO_LEADER_ID,
            "leader@rebar.dev",
            "Demo Team Leader",
            UserRole::TeamLeader,
        ),
        (DEMO_USER_ID, "site@rebar.dev", "Demo Site User", UserRole::User),
    ];

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");

    for (user_id, email, full_name, role) in accounts {
        if users::Entity::find_by_id(id(user_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(id(user_id)),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.clone()),
            full_name: Set(full_name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {email}: {e}");
            continue;
        }

        let membership = organization_users::ActiveModel {
            user_id: Set(id(user_id)),
            organization_id: Set(id(DEMO_ORG_ID)),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = membership.insert(db).await {
            eprintln!("Failed to insert membership for {email}: {e}");
        } else {
            println!("  Created user: {email}");
        }
    }
}

async fn seed_project(db: &DatabaseConnection) {
    if projects::Entity::find_by_id(id(DEMO_PROJECT_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo project already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let project = projects::ActiveModel {
        id: Set(id(DEMO_PROJECT_ID)),
        organization_id: Set(id(DEMO_ORG_ID)),
        name: Set("Riverside Office Block".to_string()),
        code: Set("RIV-001".to_string()),
        description: Set(Some("Four storey office development".to_string())),
        budget: Set(dec!(500000)),
        consumed_amount: Set(rust_decimal::Decimal::ZERO),
        revenue: Set(dec!(650000)),
        status: Set(ProjectStatus::Active),
        created_by: Set(id(DEMO_ADMIN_ID)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    if let Err(e) = project.insert(db).await {
        eprintln!("Failed to insert demo project: {e}");
    } else {
        println!("  Created project: RIV-001");
    }
}

async fn seed_line_items(db: &DatabaseConnection) {
    let items = [
        ("GRW", "Groundworks", "Excavation and foundations"),
        ("FRM", "Framing", "Structural steel and timber frame"),
        ("ELC", "Electrical", "First and second fix electrical"),
        ("PLM", "Plumbing", "Water, drainage, and heating"),
    ];

    for (code, name, description) in items {
        let existing = line_items::Entity::find()
            .filter(line_items::Column::ProjectId.eq(id(DEMO_PROJECT_ID)))
            .filter(line_items::Column::Code.eq(code))
            .one(db)
            .await
            .ok()
            .flatten();

        if existing.is_some() {
            println!("  Line item {code} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let item = line_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(id(DEMO_ORG_ID)),
            project_id: Set(id(DEMO_PROJECT_ID)),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = item.insert(db).await {
            eprintln!("Failed to insert line item {code}: {e}");
        } else {
            println!("  Created line item: {code}");
        }
    }
}

async fn seed_materials(db: &DatabaseConnection) {
    let catalog = [
        ("Ready-mix concrete C30", "m3", dec!(115.00), "CON-C30"),
        ("Rebar 16mm", "tonne", dec!(780.00), "STL-R16"),
        ("Structural timber C24", "m3", dec!(310.00), "TMB-C24"),
        ("Copper pipe 22mm", "m", dec!(9.50), "PLM-C22"),
    ];

    for (name, unit, unit_price, sku) in catalog {
        let existing = materials::Entity::find()
            .filter(materials::Column::OrganizationId.eq(id(DEMO_ORG_ID)))
            .filter(materials::Column::Sku.eq(sku))
            .one(db)
            .await
            .ok()
            .flatten();

        if existing.is_some() {
            println!("  Material {sku} already exists, skipping...");
            continue;
        }

        let now = Utc::now().into();
        let material = materials::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(id(DEMO_ORG_ID)),
            name: Set(name.to_string()),
            unit: Set(unit.to_string()),
            unit_price: Set(unit_price),
            sku: Set(Some(sku.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = material.insert(db).await {
            eprintln!("Failed to insert material {sku}: {e}");
        } else {
            println!("  Created material: {sku}");
        }
    }
}
