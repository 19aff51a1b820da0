//! Product query commands

use clap::{Args, Subcommand};
use traceport_store::repo::{AuditRepo, ProductRepo};

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List active products
    List(ListArgs),
    /// Show one product as JSON
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value = ".traceport/store.db")]
    pub db: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Product id
    pub id: String,

    #[arg(long, default_value = ".traceport/store.db")]
    pub db: String,
}

pub fn execute(args: ProductArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        ProductCommand::List(args) => execute_list(args),
        ProductCommand::Show(args) => execute_show(args),
    }
}

fn execute_list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = super::open_db(&args.db)?;
    let products = ProductRepo::list_active(&conn)?;

    println!("{} active products", products.len());
    for product in &products {
        println!(
            "  {}  {} {}  telemetry_fields={}",
            product.id,
            product.identification.brand_name,
            product.identification.model_name,
            product.operational_data().len(),
        );
    }

    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = super::open_db(&args.db)?;
    match ProductRepo::get(&conn, &args.id)? {
        Some(product) => {
            println!("{}", serde_json::to_string_pretty(&product)?);
            let entries = AuditRepo::count_for_product(&conn, &args.id)?;
            println!("audit entries: {}", entries);
            Ok(())
        }
        None => Err(format!("no product with id {}", args.id).into()),
    }
}
