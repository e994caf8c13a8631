use nepkart_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Entity as Products},
    images::PLACEHOLDER_IMAGE,
    models::Category,
    services::auth_service,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

struct SampleProduct {
    sku: &'static str,
    name: &'static str,
    category: Category,
    /// Cents.
    price: i64,
    stock: i32,
    low_stock_threshold: i32,
    /// Grams.
    weight: i64,
    origin: &'static str,
    description: &'static str,
}

const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        sku: "NEP-FOOD-001",
        name: "Wai Wai Noodles",
        category: Category::Food,
        price: 299,
        stock: 150,
        low_stock_threshold: 20,
        weight: 100,
        origin: "Kathmandu, Nepal",
        description: "Authentic Nepali instant noodles loved by millions.",
    },
    SampleProduct {
        sku: "NEP-FOOD-002",
        name: "Churpi",
        category: Category::Food,
        price: 899,
        stock: 45,
        low_stock_threshold: 10,
        weight: 200,
        origin: "Himalayan Region, Nepal",
        description: "Traditional hard cheese from the Himalayas.",
    },
    SampleProduct {
        sku: "NEP-FOOD-003",
        name: "Gundruk",
        category: Category::Food,
        price: 699,
        stock: 0,
        low_stock_threshold: 15,
        weight: 300,
        origin: "Nepal",
        description: "Fermented leafy vegetable, a staple in Nepali cuisine.",
    },
    SampleProduct {
        sku: "NEP-FOOD-004",
        name: "Momo Masala",
        category: Category::Food,
        price: 499,
        stock: 30,
        low_stock_threshold: 10,
        weight: 150,
        origin: "Kathmandu, Nepal",
        description: "Spice mix for authentic momos.",
    },
    SampleProduct {
        sku: "NEP-CLOTH-001",
        name: "Dhaka Topi",
        category: Category::Clothing,
        price: 2499,
        stock: 20,
        low_stock_threshold: 5,
        weight: 100,
        origin: "Nepal",
        description: "Traditional Nepali cap, handwoven with intricate patterns.",
    },
    SampleProduct {
        sku: "NEP-DECOR-001",
        name: "Copper Jug",
        category: Category::Decor,
        price: 4599,
        stock: 12,
        low_stock_threshold: 3,
        weight: 2500,
        origin: "Patan, Nepal",
        description: "Handcrafted copper water jug.",
    },
    SampleProduct {
        sku: "NEP-DECOR-002",
        name: "Prayer Wheel",
        category: Category::Decor,
        price: 3599,
        stock: 8,
        low_stock_threshold: 2,
        weight: 1200,
        origin: "Tibet/Nepal",
        description: "Traditional Tibetan prayer wheel, handcrafted with intricate details.",
    },
    SampleProduct {
        sku: "NEP-FOOD-005",
        name: "Rice Bag (5kg)",
        category: Category::Food,
        price: 1299,
        stock: 25,
        low_stock_threshold: 5,
        weight: 5000,
        origin: "Terai, Nepal",
        description: "Premium Basmati rice from the Terai region.",
    },
    SampleProduct {
        sku: "NEP-DECOR-003",
        name: "Brass Panas Lamps",
        category: Category::Decor,
        price: 12999,
        stock: 15,
        low_stock_threshold: 3,
        weight: 2800,
        origin: "Patan, Nepal",
        description: "Handcrafted brass panas lamps in a traditional Nepali design.",
    },
    SampleProduct {
        sku: "NEP-DECOR-004",
        name: "3-Set Moon Singing Bowl",
        category: Category::Decor,
        price: 5999,
        stock: 20,
        low_stock_threshold: 5,
        weight: 1500,
        origin: "Tibet/Nepal",
        description: "Set of three handcrafted singing bowls, each with its own harmonic tone.",
    },
    SampleProduct {
        sku: "NEP-DECOR-005",
        name: "Tibetan Rug",
        category: Category::Decor,
        price: 13499,
        stock: 10,
        low_stock_threshold: 2,
        weight: 3500,
        origin: "Tibet/Nepal",
        description: "Handwoven rug with traditional patterns and colors.",
    },
    SampleProduct {
        sku: "NEP-DECOR-006",
        name: "Antique Peacock Window",
        category: Category::Decor,
        price: 17999,
        stock: 8,
        low_stock_threshold: 2,
        weight: 4200,
        origin: "Kathmandu, Nepal",
        description: "Vintage-style window frame carved with Nepali peacock motifs.",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, 1).await?;
    run_migrations(&orm).await?;

    let created = auth_service::ensure_admin(&orm, &config.admin_username, &config.admin_password)
        .await?;
    let inserted = seed_products(&orm).await?;

    println!(
        "Seed completed. Admin {} ({}), {} products inserted",
        config.admin_username,
        if created { "created" } else { "existing" },
        inserted
    );
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<usize> {
    if Products::find().count(orm).await? > 0 {
        return Ok(0);
    }

    for sample in SAMPLE_PRODUCTS {
        ProductActive {
            id: NotSet,
            sku: Set(sample.sku.to_string()),
            name: Set(sample.name.to_string()),
            category: Set(sample.category.as_str().to_string()),
            price: Set(Decimal::new(sample.price, 2)),
            stock: Set(sample.stock),
            low_stock_threshold: Set(sample.low_stock_threshold),
            weight: Set(Decimal::new(sample.weight, 3)),
            origin: Set(sample.origin.to_string()),
            description: Set(Some(sample.description.to_string())),
            image_url: Set(PLACEHOLDER_IMAGE.to_string()),
        }
        .insert(orm)
        .await?;
    }
    Ok(SAMPLE_PRODUCTS.len())
}
