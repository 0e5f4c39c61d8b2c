//! Cache stats command - prints semantic cache statistics

use super::{bootstrap, shutdown};

/// Print statistics of the configured cache store
pub async fn run() -> anyhow::Result<()> {
    let (config, service) = bootstrap()?;

    let stats = service.cache_stats().await?;

    let location = config
        .cache
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in-memory".to_string());

    println!("Semantic cache: {}", location);
    println!("  metric:     {}", config.cache.metric);
    println!("  threshold:  {}", config.cache.distance_threshold);
    println!("  entries:    {}", stats.total_entries);
    println!("  hits:       {}", stats.hits);
    println!("  misses:     {}", stats.misses);
    println!("  evictions:  {}", stats.evictions);
    println!("  hit rate:   {:.1}%", stats.hit_rate() * 100.0);

    shutdown(&service).await;

    Ok(())
}
