//! Ezme CLI - product CSV import and SEO tooling
//!
//! # Main Commands
//!
//! ```bash
//! ezme serve                        # Start HTTP server (port 3000)
//! ezme import products.csv --save   # Import a Shopify export into the store
//! ezme products list                # Browse the stored catalog
//! ezme autolink post.html           # Link keywords in an HTML fragment
//! ezme meta fistik-ezmesi           # Meta tags for a stored product
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! ezme parse products.csv           # Just tokenize CSV to JSON
//! ezme export -o catalog.csv        # Write the store back to CSV
//! ezme rules                        # Show the built-in keyword rules
//! ```

use clap::{Parser, Subcommand};
use ezme::api::logs::LOG_BROADCASTER;
use ezme::seo::{auto_link_content_with_class, generate_meta_tags_with_brand, AUTO_LINK_CLASS};
use ezme::{
    decode_content, default_keyword_rules, detect_encoding, export_products_csv, import_csv_bytes,
    parse_bytes_auto, product_json_ld, Config, FileStorage, ImportOptions, KeywordRule,
    ParseResult, ProductRepository,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ezme")]
#[command(about = "Import product CSV exports and generate SEO markup", long_about = None)]
struct Cli {
    /// Product store directory (overrides EZME_STORE_DIR)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Do not echo pipeline logs to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a CSV file and output JSON rows
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a Shopify-style product CSV
    Import {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Persist products into the store
        #[arg(long)]
        save: bool,

        /// Output file for product JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Export stored products as Shopify-style CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert keyword links into an HTML fragment
    Autolink {
        /// Input HTML file
        input: PathBuf,

        /// Keyword rules JSON file (default: built-in rules)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// CSS class of inserted anchors
        #[arg(long, default_value = AUTO_LINK_CLASS)]
        class: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate meta tags for a stored product
    Meta {
        /// Product id
        id: String,

        /// Brand for the title (overrides EZME_BRAND)
        #[arg(short, long)]
        brand: Option<String>,

        /// Also print schema.org JSON-LD
        #[arg(long)]
        json_ld: bool,
    },

    /// Manage stored products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Show the built-in keyword rules
    Rules,

    /// Start HTTP server
    Serve {
        /// Port to listen on (overrides EZME_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all stored products
    List,

    /// Show one product as JSON
    Show {
        /// Product id
        id: String,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(store) = cli.store {
        config.store_dir = store;
    }
    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Import {
            input,
            delimiter,
            save,
            output,
            no_validate,
        } => cmd_import(&config, &input, delimiter, save, output.as_deref(), no_validate),

        Commands::Export { output } => cmd_export(&config, output.as_deref()),

        Commands::Autolink {
            input,
            rules,
            class,
            output,
        } => cmd_autolink(&input, rules.as_deref(), &class, output.as_deref()),

        Commands::Meta { id, brand, json_ld } => cmd_meta(&config, &id, brand, json_ld),

        Commands::Products { action } => cmd_products(&config, action),

        Commands::Rules => cmd_rules(),

        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            ezme::server::start_server(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn read_csv(input: &Path, delimiter: Option<char>) -> Result<ParseResult, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let result = match delimiter {
        Some(d) => {
            let encoding = detect_encoding(&bytes);
            let content = decode_content(&bytes, &encoding)?;
            ezme::parser::parse_string(&content, d, encoding)?
        }
        None => parse_bytes_auto(&bytes)?,
    };
    Ok(result)
}

fn open_repository(config: &Config) -> Result<ProductRepository<FileStorage>, Box<dyn std::error::Error>> {
    Ok(ProductRepository::new(FileStorage::new(&config.store_dir))?)
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = read_csv(input, delimiter)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.rows.len());

    let json = serde_json::to_string_pretty(&json!({
        "headers": result.headers,
        "rows": result.rows,
    }))?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_import(
    config: &Config,
    input: &Path,
    delimiter: Option<char>,
    save: bool,
    output: Option<&Path>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let bytes = fs::read(input)?;
    let options = ImportOptions {
        delimiter,
        skip_validation: no_validate,
    };
    let report = import_csv_bytes(&bytes, &options)?;

    eprintln!("   Encoding: {}", report.csv_info.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.csv_info.delimiter));
    eprintln!("   Rows: {}", report.csv_info.row_count);
    eprintln!("\n📦 Products: {} active of {} drafts", report.products.len(), report.draft_count);

    if !no_validate {
        eprintln!("\n✔️  Validation:");
        if report.invalid_count > 0 {
            eprintln!("   ✅ Valid: {}", report.valid_count);
            eprintln!("   ❌ Invalid: {}", report.invalid_count);
            for (id, errors) in report.validation_errors.iter().take(5) {
                eprintln!("\n   Product {}:", id);
                for err in errors.iter().take(3) {
                    eprintln!("     - {}", err);
                }
            }
        } else {
            eprintln!("   ✅ All {} products valid!", report.valid_count);
        }
    }

    if save {
        if report.products.is_empty() {
            eprintln!("\n⚠️  İçe aktarılacak aktif ürün bulunamadı");
        } else {
            let mut repository = open_repository(config)?;
            let inserted = repository.upsert_all(report.products.iter().cloned())?;
            eprintln!(
                "\n💾 Saved to {}: {} new, {} updated",
                config.store_dir.display(),
                inserted,
                report.products.len() - inserted
            );
        }
    }

    let json = serde_json::to_string_pretty(&report.products)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_export(config: &Config, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(config)?;
    eprintln!("📤 Exporting {} products", repository.len());

    let csv = export_products_csv(repository.list())?;
    write_output(csv.trim_end(), output)
}

fn cmd_autolink(
    input: &Path,
    rules_path: Option<&Path>,
    class: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = fs::read_to_string(input)?;
    let rules: Vec<KeywordRule> = match rules_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => default_keyword_rules(),
    };

    eprintln!("🔗 Auto-linking {} with {} rules", input.display(), rules.len());
    let linked = auto_link_content_with_class(&html, &rules, class);
    write_output(&linked, output)
}

fn cmd_meta(
    config: &Config,
    id: &str,
    brand: Option<String>,
    json_ld: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(config)?;
    let product = repository
        .get(id)
        .ok_or_else(|| format!("Product not found: {}", id))?;
    let brand = brand.unwrap_or_else(|| config.brand.clone());

    let meta = generate_meta_tags_with_brand(product, &brand);
    println!("Title:       {}", meta.title);
    println!("Description: {}", meta.description);

    if json_ld {
        let ld = product_json_ld(product, &config.base_url, &brand);
        println!("\n{}", serde_json::to_string_pretty(&ld)?);
    }

    Ok(())
}

fn cmd_products(config: &Config, action: ProductAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut repository = open_repository(config)?;

    match action {
        ProductAction::List => {
            if repository.is_empty() {
                eprintln!("📋 No products stored yet.");
                eprintln!("   Use 'ezme import <file> --save' to add some.");
                return Ok(());
            }

            eprintln!("📋 Stored products ({}):\n", repository.len());
            for p in repository.list() {
                println!("  📦 {} ({})", p.name, p.id);
                println!("     Category: {} / {}", p.category.display_name(), p.subcategory.as_str());
                if let Some(v) = p.default_variant() {
                    println!("     {}g - {:.2} TL - stock {}", v.weight, v.price, v.stock);
                }
                if !p.tags.is_empty() {
                    println!("     Tags: {}", p.tags.join(", "));
                }
                println!();
            }
            if let Some(updated) = repository.updated_at() {
                eprintln!("   Last updated: {}", updated.to_rfc3339());
            }
        }

        ProductAction::Show { id } => match repository.get(&id) {
            Some(p) => println!("{}", serde_json::to_string_pretty(p)?),
            None => return Err(format!("Product not found: {}", id).into()),
        },

        ProductAction::Delete { id } => {
            repository.delete(&id)?;
            eprintln!("🗑️  Product deleted: {}", id);
        }
    }

    Ok(())
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&default_keyword_rules())?);
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
