use clap::Parser;
use receipt_split::adapters::items::read_member_costs_file;
use receipt_split::domain::ports::{GroupDirectory, MembershipDirectory};
use receipt_split::utils::logger::{init_logger, LogFormat};
use receipt_split::utils::validation::{validate_group_id, Validate};
use receipt_split::{
    CliArgs, Command, PreparedTransaction, Result, SettleUpCaches, SettleUpClient, Settings,
    SplitError, SplitService, TransactionRequest,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_logger(format, args.verbose);

    tracing::info!("Starting receipt-split");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = run(args).await {
        tracing::error!(
            "❌ receipt-split failed: {} (Category: {:?}, retryable: {})",
            e,
            e.category(),
            e.is_retryable()
        );
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = Settings::from_file(&args.config)?;
    settings.validate()?;

    let caches = Arc::new(SettleUpCaches::new(&settings.cache));
    let client = Arc::new(SettleUpClient::new(settings.settle_up.clone(), caches)?);

    match args.command {
        Command::Groups => {
            for group in client.groups().await? {
                println!("{}\t{}", group.id, group.name);
            }
        }
        Command::Members { group_id } => {
            validate_group_id("group_id", &group_id)?;
            for member in client.members(&group_id).await? {
                println!("{}\t{}", member.id, member.name);
            }
        }
        Command::Allocate { request, items } => {
            let request = load_request(&request, items.as_deref())?;
            let service = build_service(&settings, &client);
            let prepared = service.prepare(&request).await?;
            print_prepared(&prepared)?;
        }
        Command::Submit { request, items } => {
            let request = load_request(&request, items.as_deref())?;
            let service = build_service(&settings, &client);
            let (prepared, receipt) = service.submit(&request).await?;
            print_prepared(&prepared)?;
            println!("✅ Recorded transaction {}", receipt.name);
        }
    }

    Ok(())
}

fn build_service(
    settings: &Settings,
    client: &Arc<SettleUpClient>,
) -> SplitService<Arc<SettleUpClient>, Arc<SettleUpClient>> {
    SplitService::new(client.clone(), client.clone())
        .with_scale(settings.transaction.weight_scale)
        .with_currency(settings.transaction.currency.clone())
}

fn load_request(path: &Path, items: Option<&Path>) -> Result<TransactionRequest> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SplitError::invalid_input("request", path.display(), e.to_string()))?;
    let mut request: TransactionRequest = serde_json::from_str(&content)
        .map_err(|e| SplitError::invalid_input("request", path.display(), e.to_string()))?;

    if let Some(items) = items {
        request.allocation.member_costs = read_member_costs_file(items)?;
        tracing::info!(
            "Using {} item rows from {}",
            request.allocation.member_costs.len(),
            items.display()
        );
    }

    Ok(request)
}

fn print_prepared(prepared: &PreparedTransaction) -> Result<()> {
    println!("Allocation:");
    for (member_id, amount) in prepared.allocation.iter() {
        println!("  {}\t{}", member_id, amount);
    }
    println!("Weights:");
    for entry in prepared.weights.entries() {
        println!("  {}\t{}", entry.member_id, entry.weight);
    }
    println!("{}", serde_json::to_string_pretty(&prepared.payload)?);
    Ok(())
}
