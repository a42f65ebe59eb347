// ABOUTME: Tags command implementation.
// ABOUTME: Prints the newest tags of an image from whichever registry hosts it.

use setimg::error::Result;
use setimg::output::Output;
use setimg::registry::ProviderRegistry;

pub async fn show_tags(registry: &ProviderRegistry, image: &str, output: &Output) -> Result<()> {
    output.progress(&format!("Loading tags for {image}..."));
    let tags = registry.list_tags_with_time(image).await?;
    output.tags(image, &tags);
    Ok(())
}
