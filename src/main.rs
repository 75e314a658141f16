use base64::{engine::general_purpose::STANDARD, Engine as _};
use sous_extract::{ExtractionRequest, ExtractorConfig, Orchestrator, RequestMetadata};
use std::env;
use std::error::Error;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return Err("usage: sous-extract <recipe-url> | <image-file> [image-file [image-file]]".into());
    }

    let request = if args.len() == 1 && args[0].starts_with("http") {
        ExtractionRequest::Url {
            url: args[0].clone(),
        }
    } else {
        let mut images = Vec::with_capacity(args.len());
        for path in &args {
            images.push(image_file_to_data_url(path).await?);
        }
        ExtractionRequest::Images { images }
    };

    let config = ExtractorConfig::load()?;
    let orchestrator = Orchestrator::new(config);
    let recipe = orchestrator
        .extract(request, RequestMetadata::default())
        .await?;

    println!("{}", serde_json::to_string_pretty(&recipe)?);
    Ok(())
}

/// Read an image file and encode it as the data-URL payload the pipeline
/// expects. MIME type is guessed from the file extension.
async fn image_file_to_data_url(path: &str) -> Result<String, Box<dyn Error>> {
    let bytes = tokio::fs::read(path).await?;
    let mime = match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        other => {
            return Err(format!(
                "unsupported image extension '{}' for '{}'",
                other.unwrap_or(""),
                path
            )
            .into())
        }
    };

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
}
