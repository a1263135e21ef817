use clap::Parser;
use simple_alexa_rank::utils::logger;
use simple_alexa_rank::{CliConfig, LookupEngine, LookupMode, RankLookupClient, RankRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting simple-alexa-rank CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let client = match cli.client_config().and_then(|config| RankLookupClient::new(&config)) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Using ranking API at {}", client.base_url());

    let mode = if cli.xml {
        LookupMode::Document
    } else {
        LookupMode::Rank
    };

    let engine = LookupEngine::new(client);
    let records = engine.run(&cli.domains, mode).await;

    for record in &records {
        if cli.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            print_record(record);
        }
    }

    if records.iter().any(|record| !record.is_success()) {
        std::process::exit(2);
    }

    Ok(())
}

fn print_record(record: &RankRecord) {
    match (&record.error, record.rank, &record.document) {
        (Some(error), _, _) => eprintln!("{}: ❌ {}", record.domain, error),
        (None, Some(rank), _) => println!("{}\t{}", record.domain, rank),
        (None, None, Some(document)) => println!("{}\t{}", record.domain, document),
        (None, None, None) => println!("{}\t-", record.domain),
    }
}
