//! Terminal front end for the search console.

use std::sync::Arc;

use clap::builder::PossibleValuesParser;
use clap::Args;
use explorer_core::{SelectionStore, ServerConfig, Settings};
use explorer_dip::params::{DATUM_END, DATUM_START, INITIATIVE, PERSON_ID, TITEL, VORGANGSTYP, WAHLPERIODE};
use explorer_dip::{Dataset, DipClient, ParamValue, PersonRef, QueryParams};
use explorer_gemini::{GeminiClient, GeminiTask, TaskWorkspace, LENGTH_PRESETS, TONE_PRESETS};
use explorer_search::presentation::{badges, display_title, result_info, select_document, source_links};
use explorer_search::{build_params, defaults_to_filter_state, PersonLookup, SearchSession};

#[derive(Args)]
pub struct SearchArgs {
    /// Dataset (default: the configured default dataset)
    #[arg(long)]
    dataset: Option<String>,
    /// Title phrases, separated by ';'
    #[arg(long)]
    title: Option<String>,
    #[arg(long = "wahlperiode")]
    wahlperioden: Vec<i64>,
    #[arg(long = "vorgangstyp")]
    vorgangstypen: Vec<String>,
    #[arg(long = "initiative")]
    initiativen: Vec<String>,
    /// Descriptors, separated by ';'
    #[arg(long)]
    deskriptor: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    #[arg(long = "person-id")]
    person_ids: Vec<i64>,
    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pages: usize,
    /// Send the first hit through the Gemini task workspace
    #[arg(long)]
    summarize: bool,
    /// Gemini task for --summarize (default: the configured task)
    #[arg(long)]
    task: Option<String>,
    /// Tone for --summarize
    #[arg(long, value_parser = PossibleValuesParser::new(TONE_PRESETS.iter().copied()))]
    tone: Option<String>,
    /// Answer length for --summarize
    #[arg(long, value_parser = PossibleValuesParser::new(LENGTH_PRESETS.iter().copied()))]
    length: Option<String>,
}

#[derive(Args)]
pub struct PersonsArgs {
    query: String,
    /// Already selected person ids to merge into the suggestions
    #[arg(long = "selected")]
    selected: Vec<i64>,
}

fn load_settings(config: &ServerConfig) -> anyhow::Result<Settings> {
    Ok(Settings::load(&config.data_paths.settings_file)?)
}

/// Configured defaults overlaid with the flags that were given.
fn search_filters(settings: &Settings, args: &SearchArgs) -> QueryParams {
    let mut filters = defaults_to_filter_state(&QueryParams::from_json_map(
        &settings.bundestag.default_filters,
    ));

    if let Some(title) = &args.title {
        filters.title = title.clone();
    }
    if let Some(deskriptor) = &args.deskriptor {
        filters.deskriptor = deskriptor.clone();
    }
    if !args.wahlperioden.is_empty() {
        filters.wahlperioden = args.wahlperioden.iter().map(|&w| w.into()).collect();
    }
    if !args.vorgangstypen.is_empty() {
        filters.vorgangstypen = args.vorgangstypen.clone();
    }
    if !args.initiativen.is_empty() {
        filters.initiativen = args.initiativen.clone();
    }
    if let Some(from) = &args.from {
        filters.date_start = from.clone();
    }
    if let Some(to) = &args.to {
        filters.date_end = to.clone();
    }
    if !args.person_ids.is_empty() {
        filters.persons = args.person_ids.iter().map(|&id| PersonRef::new(id, "")).collect();
    }

    build_params(&filters)
}

fn describe(params: &QueryParams) -> String {
    [TITEL, WAHLPERIODE, VORGANGSTYP, INITIATIVE, DATUM_START, DATUM_END, PERSON_ID]
        .iter()
        .filter_map(|key| {
            params.get(key).map(|v: &ParamValue| {
                let values: Vec<String> = v.as_slice().iter().map(ToString::to_string).collect();
                format!("{}={}", key, values.join(","))
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn search(config: ServerConfig, args: SearchArgs) -> anyhow::Result<()> {
    let settings = load_settings(&config)?;
    let dataset: Dataset = args
        .dataset
        .as_deref()
        .unwrap_or(settings.bundestag.default_dataset.as_str())
        .parse()?;
    let params = search_filters(&settings, &args);

    println!("{} [{}]", dataset.label(), describe(&params));

    let client = Arc::new(DipClient::from_settings(&settings.bundestag)?);
    let mut session = SearchSession::new(client, dataset);
    session.search_params(params).await?;
    for _ in 1..args.pages.max(1) {
        if !session.result().has_more() {
            break;
        }
        session.load_more().await?;
    }

    println!("{}", result_info(session.result()));
    for doc in session.documents() {
        println!();
        println!("* {}", display_title(doc));
        let tags = badges(doc);
        if !tags.is_empty() {
            println!("  {}", tags.join(" | "));
        }
        let links = source_links(doc);
        for url in links.pdf_url.iter().chain(links.xml_url.iter()) {
            println!("  {}", url);
        }
    }

    if args.summarize {
        let Some(first) = session.documents().first() else {
            println!("\nKeine Treffer zum Zusammenfassen.");
            return Ok(());
        };
        let store = Arc::new(SelectionStore::new());
        select_document(&store, first);

        let backend = Arc::new(GeminiClient::new(&settings.gemini, &settings.ui.preferred_language)?);
        let model = backend.model().to_string();
        let mut workspace = TaskWorkspace::new(backend, store, &settings);
        if !workspace.can_run() {
            println!("\nDer erste Treffer enthält keinen Text.");
            return Ok(());
        }
        if let Some(task) = &args.task {
            workspace.task = GeminiTask::parse_lossy(task);
        }
        if let Some(tone) = args.tone {
            workspace.tone = tone;
        }
        if let Some(length) = args.length {
            workspace.length = length;
        }
        let result = workspace.run().await?;
        println!(
            "\n--- {} ({}, {}) ---\n{}",
            workspace.task.label(),
            display_title(first),
            model,
            result.text
        );
    }

    Ok(())
}

pub async fn persons(config: ServerConfig, args: PersonsArgs) -> anyhow::Result<()> {
    let settings = load_settings(&config)?;
    let client = Arc::new(DipClient::from_settings(&settings.bundestag)?);

    let lookup = PersonLookup::new(client);
    lookup.on_query_change(&args.query);
    lookup.wait_idle().await;

    let selected: Vec<PersonRef> = args.selected.iter().map(|&id| PersonRef::new(id, "")).collect();
    let options = lookup.combined_options(&selected);
    if options.is_empty() {
        println!("Keine Personen gefunden.");
    }
    for person in options {
        match person.caption() {
            Some(caption) => println!("{:>8}  {} ({})", person.key(), person.label(), caption),
            None => println!("{:>8}  {}", person.key(), person.label()),
        }
    }
    Ok(())
}
