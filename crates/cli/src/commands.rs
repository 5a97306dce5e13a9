use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// List tables in the source schema
    Tables {
        #[arg(long, default_value = "public", help = "Source schema name")]
        schema: String,

        #[arg(long, help = "Print the table list as JSON")]
        json: bool,
    },
    /// Show the column layout of a source table
    Schema {
        #[arg(help = "Source table name")]
        table: String,

        #[arg(long, default_value = "public", help = "Source schema name")]
        schema: String,

        #[arg(long, help = "Print the schema as JSON")]
        json: bool,
    },
    /// Suggest a mapping plan and destination DDL for a source table
    Plan {
        #[arg(help = "Source table name")]
        table: String,

        #[arg(long, default_value = "public", help = "Source schema name")]
        schema: String,

        #[arg(long, help = "Destination table name (defaults to the source name)")]
        destination: Option<String>,

        #[arg(long, help = "Print the plan as JSON")]
        json: bool,
    },
    /// Migrate a table and follow its progress until it finishes
    Migrate {
        #[arg(help = "Source table name")]
        table: String,

        #[arg(long, default_value = "public", help = "Source schema name")]
        schema: String,

        #[arg(long, help = "Destination table name (defaults to the source name)")]
        destination: Option<String>,

        #[arg(long, default_value_t = 10_000, help = "Rows per batch")]
        batch_size: usize,

        #[arg(long, default_value = "", help = "Free-text run description")]
        description: String,

        #[arg(long, help = "Assume the destination table already exists")]
        no_create_table: bool,
    },
    /// Show one migration's ledger record
    Status {
        #[arg(help = "Migration id")]
        id: String,

        #[arg(long, help = "Print the record as JSON")]
        json: bool,
    },
    /// List past migration runs, most recent first
    History {
        #[arg(long, default_value_t = 20, help = "Page size")]
        limit: u64,

        #[arg(long, default_value_t = 0, help = "Page offset")]
        offset: u64,

        #[arg(long, help = "Filter by status: pending, running, completed, failed")]
        status: Option<String>,

        #[arg(long, help = "Print the page as JSON")]
        json: bool,
    },
}
