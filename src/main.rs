use exam_seating::config::Config;
use exam_seating::display::{print_allocation, write_allocation_to_file};
use exam_seating::parser::load_seating_input;
use exam_seating::request::{export_allocation_to_csv, run_with_strategy, Strategy};
use exam_seating::web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = Config::from_env();
    let args: Vec<String> = std::env::args().collect();

    // Web mode
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }
        println!("Starting web server on port {}...", config.port);
        println!("Access the API at http://localhost:{}/api/patterns", config.port);

        web::start_server(config).await?;
        return Ok(());
    }

    // CLI mode: <csv> [pattern] [seed]
    let csv_path = match args.get(1) {
        Some(path) => path.clone(),
        None => {
            eprintln!("Usage: {} <seating.csv> [pattern] [seed] | web [port]", args[0]);
            std::process::exit(2);
        }
    };
    let pattern = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| config.pattern.name().to_string());
    let seed = args.get(3).and_then(|s| s.parse::<u64>().ok());
    let strategy = if seed.is_some() { Strategy::CohortShuffle } else { Strategy::Pairs };

    println!("Loading seating input from {}...", csv_path);
    let input = load_seating_input(&csv_path, &config.room_defaults, config.max_room_desks)?;
    println!("Loaded {} roll rows and {} rooms", input.students.len(), input.rooms.len());

    let result = run_with_strategy(&input.students, &input.rooms, &pattern, strategy, seed);
    print_allocation(&result);

    std::fs::create_dir_all(&config.output_dir)?;
    let layout_path = config.output_dir.join("seating_layout.txt");
    let export_path = config.output_dir.join("seating_export.csv");
    write_allocation_to_file(&result, &layout_path)?;
    export_allocation_to_csv(&result, &export_path)?;
    println!("Seating plan saved to:");
    println!("  - {}", layout_path.display());
    println!("  - {}", export_path.display());

    Ok(())
}
