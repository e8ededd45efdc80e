//! Debug script to run a live OMDb search and detail lookup
//!
//! Run with: OMDB_API_KEY=... cargo run --example debug_search -p cinesearch-core -- "blade runner"
//!
//! Set `RUST_LOG=cinesearch_core=debug` to see request spans.

use cinesearch_core::view::search_summary;
use cinesearch_core::{
    AppConfig, CancelToken, MovieApi, OmdbClient, SearchParams, SearchType,
};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let client = OmdbClient::with_config(config.omdb)?;

    let text = std::env::args().nth(1).unwrap_or_else(|| "blade runner".to_string());
    let params = SearchParams::new(text, SearchType::Movie);
    let cancel = CancelToken::new();

    println!("Searching for {:?} ({})...\n", params.text, params.to_query_string());

    let result = client.search(&params, &cancel).await?;
    println!("{}\n", search_summary(&params, result.total_count));

    for (i, movie) in result.items.iter().enumerate() {
        println!("{}. {} ({})", i + 1, movie.title, movie.year);
        println!("   IMDb: {}", movie.imdb_url());
        println!("   Poster: {}", movie.poster().unwrap_or("none"));
    }

    let Some(first) = result.items.first() else {
        println!("No results found!");
        return Ok(());
    };

    println!("\nFetching details for {}...\n", first.id);
    match client.movie_by_id(&first.id, &cancel).await {
        Ok(details) => {
            println!("{} ({}) - {}", details.title, details.year, details.runtime);
            println!("Genres: {}", details.genres.join(", "));
            println!("Director: {}", details.director);
            println!("IMDb rating: {}", details.imdb_rating);
            println!("\n{}", details.plot);
        }
        Err(e) => println!("Failed to load details: {e}"),
    }

    Ok(())
}
