use chrono::Datelike;
use clap::Parser;
use optica_ledger::config::{CliConfig, Command, LocalStorage, TomlConfig};
use optica_ledger::core::chart::ChartView;
use optica_ledger::core::export::{ExportFormat, SpreadsheetExporter};
use optica_ledger::core::form::{SaleForm, SaleFormInput};
use optica_ledger::core::notify::ConsoleNotifier;
use optica_ledger::core::pdf::{format_currency, SalePdfRenderer};
use optica_ledger::core::{ChartSeries, ConfigProvider, SaleRepository};
use optica_ledger::utils::{logger, validation::Validate};
use optica_ledger::{
    LedgerError, ProductoClient, ReturnRoute, SaleEditorScreen, SaleId, SaleListScreen, SaleRecord,
    SalesChartScreen,
};

fn report_and_exit(e: &LedgerError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting optica-ledger CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        report_and_exit(&e);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => report_and_exit(&e),
    };

    if let Err(e) = run(&cli, &config).await {
        report_and_exit(&e);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &TomlConfig) -> optica_ledger::Result<()> {
    let client = ProductoClient::from_config(config)?;
    let storage = LocalStorage::new(config.output_path().to_string());

    match &cli.command {
        Command::List => {
            let mut screen = SaleListScreen::new(client, ConsoleNotifier);
            print_table(screen.refresh().await?);
        }
        Command::Show { id } => {
            let record = client.get(&SaleId::from(id.as_str())).await?;
            print_record(&record);
        }
        Command::Create { file, from } => {
            let input = SaleFormInput::from_file(file)?;
            let mut editor = SaleEditorScreen::new(client.clone(), ConsoleNotifier);
            editor.open_with(SaleForm::from_input(input), from.as_deref());

            let (saved, route) = editor.save().await?;
            print_record(&saved);
            return_to(route, client).await?;
        }
        Command::Edit {
            id,
            file,
            fields,
            from,
        } => {
            let mut editor = SaleEditorScreen::new(client.clone(), ConsoleNotifier);
            editor
                .open_existing(&SaleId::from(id.as_str()), from.as_deref())
                .await?;

            if let Some(file) = file {
                let input = SaleFormInput::from_file(file)?;
                editor.form_mut().merge_input(&input);
            }
            fields.apply(editor.form_mut());

            let (saved, route) = editor.save().await?;
            print_record(&saved);
            return_to(route, client).await?;
        }
        Command::Delete { id } => {
            let mut screen = SaleListScreen::new(client, ConsoleNotifier);
            screen.delete(&SaleId::from(id.as_str())).await?;
            print_table(screen.records());
        }
        Command::Search { name } => {
            let mut screen = SaleListScreen::new(client, ConsoleNotifier);
            print_table(screen.search(name).await?);
        }
        Command::Increment { id } => {
            client.increment_counter(&SaleId::from(id.as_str())).await?;
            println!("✅ Counter incremented for {}", id);
        }
        Command::Chart { view, month, year } => {
            let current_year = chrono::Local::now().year();
            let mut screen = SalesChartScreen::new(client, ConsoleNotifier, current_year);
            screen.load().await?;
            screen.select_view(*view);
            let series = screen.set_period(*month, year.or(Some(current_year)))?;

            let years: Vec<String> = screen
                .available_years()
                .iter()
                .map(|y| y.to_string())
                .collect();
            println!("Años disponibles: {}", years.join(", "));
            print_series(&series, *view);
        }
        Command::ChartData => {
            let data = client.chart_data().await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Export { format, filename } => {
            let mut screen = SaleListScreen::new(client, ConsoleNotifier);
            screen.refresh().await?;

            let exporter = SpreadsheetExporter::new(config.sheet_name());
            let default_name = match format {
                ExportFormat::Xlsx => config.export.xlsx_filename.as_str(),
                ExportFormat::Csv => config.export.csv_filename.as_str(),
            };
            let path = screen
                .export_spreadsheet(
                    &storage,
                    &exporter,
                    *format,
                    Some(filename.as_deref().unwrap_or(default_name)),
                )
                .await?;
            println!("📁 Output saved to: {}", path);
        }
        Command::Pdf { id, filename } => {
            let mut editor = SaleEditorScreen::new(client, ConsoleNotifier);
            editor.open_existing(&SaleId::from(id.as_str()), None).await?;

            let renderer = SalePdfRenderer::from_config(config);
            let path = editor
                .export_pdf(
                    &renderer,
                    &storage,
                    Some(filename.as_deref().unwrap_or(&config.export.pdf_filename)),
                )
                .await?;
            println!("📁 Output saved to: {}", path);
        }
    }

    Ok(())
}

async fn return_to(route: ReturnRoute, client: ProductoClient) -> optica_ledger::Result<()> {
    if route == ReturnRoute::SaleList {
        let mut screen = SaleListScreen::new(client, ConsoleNotifier);
        print_table(screen.refresh().await?);
    }
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn print_table(records: &[SaleRecord]) {
    println!(
        "{:<26} {:<14} {:<22} {:<14} {:>12} {:>12} {:>12} {:<10}",
        "ID", "Vendedor", "Nombre", "RUT", "Precio", "Abono", "Saldo", "Fecha"
    );
    for record in records {
        let id = record.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let date = record
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<26} {:<14} {:<22} {:<14} {:>12} {:>12} {:>12} {:<10}",
            truncate(&id, 26),
            truncate(&record.seller_name, 14),
            truncate(&record.customer_name, 22),
            truncate(&record.customer_tax_id, 14),
            format_currency(record.price),
            format_currency(record.deposit),
            format_currency(record.balance),
            date
        );
    }
    println!("{} ventas", records.len());
}

fn print_record(record: &SaleRecord) {
    let id = record.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    println!("ID:           {}", id);
    println!("Vendedor:     {}", record.seller_name);
    println!("Nombre:       {}", record.customer_name);
    println!("RUT:          {}", record.customer_tax_id);
    println!("Teléfono:     {}", record.customer_phone);
    println!("Precio:       {}", format_currency(record.price));
    println!("Abono:        {}", format_currency(record.deposit));
    println!("Saldo:        {}", format_currency(record.balance));
    println!(
        "Fecha:        {}",
        record
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    );
    println!("Observación:  {}", record.note);
    println!("Tipo de pago: {}", record.payment_type);
    for (index, item) in record.line_items.iter().enumerate() {
        let values: Vec<String> = item
            .fields()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        println!("Tabla {}:      {}", index + 1, values.join(" "));
    }
}

fn print_series(series: &ChartSeries, view: ChartView) {
    const BAR_WIDTH: f64 = 40.0;
    let max = series
        .points
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max);

    for point in &series.points {
        let len = if max > 0.0 {
            ((point.value.abs() / max) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        let value = match view {
            ChartView::IncomeByMonth => format_currency(point.value),
            _ => format!("{}", point.value),
        };
        println!("{:<16} {:>12} {}", truncate(&point.name, 16), value, "█".repeat(len));
    }

    let total = match view {
        ChartView::IncomeByMonth => format_currency(series.total),
        _ => format!("{}", series.total),
    };
    println!("Total: {}", total);
}
