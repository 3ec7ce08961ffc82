//! Seed the database with sample data for local development.
//!
//! Inserts a business-owner account, a couple of businesses, and a small
//! catalog of products and services so the API has something to serve on a
//! fresh database. Seeded rows are tagged by their well-known owner emails
//! (`*@seed.townsquare.test`), which is what `--reset` deletes by.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use super::{CommandError, connect};

/// Domain used for all seeded accounts so `--reset` can find them.
const SEED_DOMAIN: &str = "seed.townsquare.test";

struct SeedBusiness {
    owner_email: &'static str,
    name: &'static str,
    business_type: &'static str,
    description: &'static str,
    city_code: &'static str,
    city_name: &'static str,
    state_code: &'static str,
    state_name: &'static str,
    products: &'static [(&'static str, &'static str, &'static str)],
    services: &'static [(&'static str, &'static str, &'static str, i32)],
}

const SEED_BUSINESSES: &[SeedBusiness] = &[
    SeedBusiness {
        owner_email: "bakery@seed.townsquare.test",
        name: "Corner Crust Bakery",
        business_type: "bakery",
        description: "Sourdough, pastries, and custom cakes baked daily.",
        city_code: "133024",
        city_name: "Mumbai",
        state_code: "MH",
        state_name: "Maharashtra",
        products: &[
            ("Sourdough Loaf", "Naturally leavened, 24-hour ferment.", "180.00"),
            ("Almond Croissant", "Twice-baked with frangipane.", "120.00"),
            ("Chocolate Babka", "Dark chocolate swirl.", "350.00"),
        ],
        services: &[(
            "Custom Cake Consultation",
            "Design session for wedding and birthday cakes.",
            "500.00",
            45,
        )],
    },
    SeedBusiness {
        owner_email: "salon@seed.townsquare.test",
        name: "Luna Hair Studio",
        business_type: "salon",
        description: "Cuts, color, and styling by appointment.",
        city_code: "133024",
        city_name: "Mumbai",
        state_code: "MH",
        state_name: "Maharashtra",
        products: &[("Argan Oil Serum", "Leave-in treatment, 50ml.", "650.00")],
        services: &[
            ("Haircut", "Wash, cut, and blow-dry.", "800.00", 60),
            ("Full Color", "Single-process color.", "2500.00", 120),
        ],
    },
];

/// Seed the database with sample businesses and catalog items.
///
/// Safe to run repeatedly: inserts are keyed on the seeded owner emails and
/// skipped when the business already exists.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn sample_data(reset: bool) -> Result<(), CommandError> {
    info!("Connecting to marketplace database...");
    let pool = connect().await?;

    if reset {
        clear_seeded(&pool).await?;
    }

    let mut inserted = 0;
    for seed in SEED_BUSINESSES {
        if insert_business(&pool, seed).await? {
            inserted += 1;
        }
    }

    info!(
        inserted,
        skipped = SEED_BUSINESSES.len() - inserted,
        "Seed complete"
    );
    Ok(())
}

/// Delete previously seeded rows. Products and services cascade from their
/// business rows.
async fn clear_seeded(pool: &PgPool) -> Result<(), CommandError> {
    let result = sqlx::query("DELETE FROM businesses WHERE owner_email LIKE '%@' || $1")
        .bind(SEED_DOMAIN)
        .execute(pool)
        .await?;
    info!(deleted = result.rows_affected(), "Cleared seeded businesses");
    Ok(())
}

/// Insert one seeded business with its catalog. Returns false when the
/// business already exists.
async fn insert_business(pool: &PgPool, seed: &SeedBusiness) -> Result<bool, CommandError> {
    let mut tx = pool.begin().await?;

    let business_id: Option<i32> = sqlx::query_scalar(
        r"
        INSERT INTO businesses
            (owner_email, name, business_type, description,
             city_code, city_name, state_code, state_name, verified)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
        ON CONFLICT (owner_email) DO NOTHING
        RETURNING id
        ",
    )
    .bind(seed.owner_email)
    .bind(seed.name)
    .bind(seed.business_type)
    .bind(seed.description)
    .bind(seed.city_code)
    .bind(seed.city_name)
    .bind(seed.state_code)
    .bind(seed.state_name)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(business_id) = business_id else {
        tx.rollback().await?;
        info!(business = seed.name, "Already seeded, skipping");
        return Ok(false);
    };

    // Owner account so the business side of conversations and orders works.
    sqlx::query(
        r"
        INSERT INTO users (email, first_name, last_name, kind, auth_provider)
        VALUES ($1, $2, '', 'business_owner', 'password')
        ON CONFLICT (email) DO NOTHING
        ",
    )
    .bind(seed.owner_email)
    .bind(seed.name)
    .execute(&mut *tx)
    .await?;

    for (name, description, price) in seed.products {
        sqlx::query(
            r"
            INSERT INTO products (business_id, name, description, price)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(business_id)
        .bind(name)
        .bind(description)
        .bind(parse_price(price))
        .execute(&mut *tx)
        .await?;
    }

    for (name, description, price, duration_minutes) in seed.services {
        sqlx::query(
            r"
            INSERT INTO services (business_id, name, description, price, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(business_id)
        .bind(name)
        .bind(description)
        .bind(parse_price(price))
        .bind(duration_minutes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(business = seed.name, id = business_id, "Seeded");
    Ok(true)
}

/// Seed prices are compile-time literals, so a parse failure is a bug in
/// this file rather than a runtime condition.
fn parse_price(raw: &str) -> Decimal {
    raw.parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_prices_all_parse() {
        for seed in SEED_BUSINESSES {
            for (name, _, price) in seed.products {
                assert!(
                    price.parse::<Decimal>().is_ok(),
                    "bad price for product {name}"
                );
            }
            for (name, _, price, _) in seed.services {
                assert!(
                    price.parse::<Decimal>().is_ok(),
                    "bad price for service {name}"
                );
            }
        }
    }

    #[test]
    fn seed_emails_use_seed_domain() {
        for seed in SEED_BUSINESSES {
            assert!(seed.owner_email.ends_with(SEED_DOMAIN));
        }
    }
}
