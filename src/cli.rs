//! CLI commands for scanning and profile management

use plantcare::capture::{CameraBackend, CameraSession, CapturedImage, FacingMode, MockCamera};
use plantcare::config::{AppConfig, ConfigError};
use plantcare::forms::Field;
use plantcare::metrics::MetricsRegistry;
use plantcare::prediction::{
    advice_lines, confidence_percent, format_prediction_date_local, parse_advice, plant_image_url,
    AdviceLine, AdviceSections, PredictionResult,
};
use plantcare::service::{ImageKind, MockPlantCareApi, PlantCareApi, UserProfile};
use plantcare::workflow::{ProfileWorkflow, ScanScreen, ScanWorkflow};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{info, warn};

type CliResult = Result<(), Box<dyn Error>>;

/// Reads the config file if given, then applies environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

fn runtime() -> Result<Runtime, Box<dyn Error>> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn backend(config: &AppConfig, native: bool) -> Result<Box<dyn CameraBackend>, Box<dyn Error>> {
    if !native {
        return Ok(Box::new(MockCamera::new()));
    }
    #[cfg(feature = "camera")]
    {
        Ok(Box::new(plantcare::capture::NativeCamera::new(
            config.camera.clone(),
        )))
    }
    #[cfg(not(feature = "camera"))]
    {
        let _ = config;
        Err("built without the `camera` feature; rebuild with --features camera".into())
    }
}

fn api(config: &AppConfig) -> Result<Arc<dyn PlantCareApi>, Box<dyn Error>> {
    if config.service.use_mock {
        return Ok(Arc::new(MockPlantCareApi::new(config.service.delays())));
    }
    #[cfg(feature = "http")]
    {
        let api = plantcare::service::HttpPlantCareApi::new(
            config.service.base_url.clone(),
            config.service.token.clone(),
        )?;
        Ok(Arc::new(api))
    }
    #[cfg(not(feature = "http"))]
    {
        Err("built without the `http` feature; set service.use_mock or rebuild with --features http".into())
    }
}

/// Creates the registry and, when a port is configured, serves it.
fn start_metrics(runtime: &Runtime, config: &AppConfig) -> Result<Arc<MetricsRegistry>, Box<dyn Error>> {
    let registry = Arc::new(MetricsRegistry::new()?);
    if config.metrics.enabled() {
        #[cfg(feature = "metrics")]
        {
            use plantcare::metrics::{MetricsServer, MetricsServerConfig};

            let server = MetricsServer::new(
                MetricsServerConfig::with_port(config.metrics.port),
                Arc::clone(&registry),
            );
            runtime.spawn(async move {
                if let Err(e) = server.run().await {
                    warn!(error = %e, "Metrics server stopped");
                }
            });
        }
        #[cfg(not(feature = "metrics"))]
        {
            let _ = runtime;
            warn!(
                port = config.metrics.port,
                "Metrics port configured but built without the `metrics` feature"
            );
        }
    }
    Ok(registry)
}

fn failure(message: Option<&str>, fallback: &str) -> Box<dyn Error> {
    message.unwrap_or(fallback).into()
}

/// Capture a still and optionally analyze it
pub fn scan(
    config: &AppConfig,
    facing: Option<FacingMode>,
    output: Option<PathBuf>,
    analyze: bool,
    native: bool,
) -> CliResult {
    let runtime = runtime()?;
    let metrics = start_metrics(&runtime, config)?;

    let session = CameraSession::new(backend(config, native)?, config.camera.clone())
        .with_metrics(Arc::clone(&metrics));
    let mut flow = ScanWorkflow::new(session, api(config)?).with_metrics(metrics);

    if !flow.probe_camera() {
        return Err(failure(flow.error(), "Camera unavailable"));
    }

    match facing {
        Some(facing) => flow.open_camera_facing(facing),
        None => flow.open_camera(),
    }
    if flow.screen() != ScanScreen::Camera {
        return Err(failure(flow.error(), "Could not open the camera"));
    }
    if let Some(preview) = flow.preview() {
        info!(
            stream = %preview.stream_id,
            facing = %preview.facing_mode,
            resolution = ?preview.resolution,
            "Camera open"
        );
    }

    if !flow.take_photo() {
        return Err(failure(flow.error(), "Capture failed"));
    }

    if let Some(still) = flow.captured() {
        println!(
            "Captured {} {} ({} bytes)",
            still.resolution(),
            still.mime_type(),
            still.len()
        );
        if let Some(path) = &output {
            std::fs::write(path, still.bytes())?;
            println!("Saved to {}", path.display());
        }
    }

    if analyze {
        analyze_and_print(&runtime, &mut flow, config)?;
    }
    Ok(())
}

/// Analyze an image file
pub fn upload(config: &AppConfig, path: PathBuf) -> CliResult {
    let runtime = runtime()?;
    let metrics = start_metrics(&runtime, config)?;

    let session = CameraSession::new(MockCamera::new(), config.camera.clone());
    let mut flow = ScanWorkflow::new(session, api(config)?).with_metrics(metrics);

    if !flow.upload_file(&path) {
        return Err(failure(flow.error(), "Could not read the image"));
    }
    analyze_and_print(&runtime, &mut flow, config)
}

fn analyze_and_print<B: CameraBackend>(
    runtime: &Runtime,
    flow: &mut ScanWorkflow<B>,
    config: &AppConfig,
) -> CliResult {
    println!("Analyzing...");
    match runtime.block_on(flow.analyze()) {
        Some(prediction) => {
            print_prediction(prediction, &config.service.base_url);
            Ok(())
        }
        None => Err(failure(flow.error(), "Analysis failed")),
    }
}

fn print_prediction(prediction: &PredictionResult, base_url: &str) {
    println!();
    println!("{}", prediction.display_name);
    println!(
        "  Confidence: {} ({})",
        confidence_percent(prediction.confidence),
        prediction.confidence_level()
    );
    println!("  Scanned:    {}", format_prediction_date_local(&prediction.timestamp));
    println!("  Image:      {}", plant_image_url(prediction, Some(base_url)));
    print_sections(&prediction.advice_sections());
}

fn print_sections(sections: &AdviceSections) {
    let mut parts = vec![
        ("Treatment", sections.treatment.as_str()),
        ("Prevention", sections.prevention.as_str()),
    ];
    if let Some(additional) = &sections.additional {
        parts.push(("Additional information", additional.as_str()));
    }

    for (title, body) in parts {
        println!();
        println!("{}", title.to_uppercase());
        for line in advice_lines(body) {
            match line {
                AdviceLine::Heading(text) => println!("## {}", text),
                AdviceLine::Bullet { depth, text } => {
                    let indent = "  ".repeat(usize::from(depth.saturating_sub(1)));
                    println!("{}- {}", indent, text);
                }
                AdviceLine::Rule => println!("----"),
                AdviceLine::Blank => println!(),
                AdviceLine::Paragraph(text) => println!("{}", text),
            }
        }
    }
}

/// Print advice text split into sections
pub fn advice(source: &str) -> CliResult {
    let text = if source == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(source)?
    };
    print_sections(&parse_advice(&text));
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("{} (@{})", profile.display_name(), profile.username);
    println!("  Email:  {}", profile.email);
    if let Some(description) = &profile.description {
        println!("  About:  {}", description);
    }
    if let Some(avatar) = &profile.avatar {
        println!("  Avatar: {}", avatar);
    }
    if let Some(cover) = &profile.cover_image {
        println!("  Cover:  {}", cover);
    }
}

/// List past scans
pub fn history(config: &AppConfig) -> CliResult {
    let runtime = runtime()?;
    let api = api(config)?;

    let entries = runtime.block_on(api.fetch_history())?;
    if entries.is_empty() {
        println!("No scan history yet");
        println!("When you scan plants, your history will appear here");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "{}  {} ({})",
            format_prediction_date_local(&entry.timestamp),
            entry.display_name,
            confidence_percent(entry.confidence)
        );
    }
    Ok(())
}

/// Print the profile
pub fn profile_show(config: &AppConfig) -> CliResult {
    let runtime = runtime()?;
    let mut flow = ProfileWorkflow::new(api(config)?);

    match runtime.block_on(flow.load()) {
        Some(profile) => {
            print_profile(profile);
            Ok(())
        }
        None => Err(failure(flow.error(), "Failed to load profile")),
    }
}

/// Field changes requested on the command line.
pub struct ProfileChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<PathBuf>,
    pub cover: Option<PathBuf>,
}

/// Apply profile changes and print the result
pub fn profile_update(config: &AppConfig, changes: ProfileChanges) -> CliResult {
    let runtime = runtime()?;
    let mut flow = ProfileWorkflow::new(api(config)?);

    runtime.block_on(async {
        if flow.load().await.is_none() {
            return Err(failure(flow.error(), "Failed to load profile"));
        }
        flow.begin_edit();

        for (kind, path) in [
            (ImageKind::Avatar, &changes.avatar),
            (ImageKind::Cover, &changes.cover),
        ] {
            let Some(path) = path else { continue };
            let image = CapturedImage::from_file(path)?;
            if flow.upload_image(kind, &image).await.is_none() {
                let message = flow.field_errors().get(Field::Image).or(flow.error());
                return Err(failure(message, "Image upload failed"));
            }
        }

        if let Some(draft) = flow.draft_mut() {
            if changes.username.is_some() {
                draft.username = changes.username.clone();
            }
            if changes.first_name.is_some() {
                draft.first_name = changes.first_name.clone();
            }
            if changes.last_name.is_some() {
                draft.last_name = changes.last_name.clone();
            }
            if changes.description.is_some() {
                draft.description = changes.description.clone();
            }
        }

        if !flow.save_draft().await {
            let message = flow.field_errors().get(Field::Username).or(flow.error());
            return Err(failure(message, "Failed to save changes"));
        }
        if let Some(profile) = flow.profile() {
            print_profile(profile);
        }
        Ok::<(), Box<dyn Error>>(())
    })
}

/// Hold a camera session open until Ctrl-C, then release it
pub fn preview(config: &AppConfig, facing: Option<FacingMode>, native: bool) -> CliResult {
    let runtime = runtime()?;
    let metrics = start_metrics(&runtime, config)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))?;

    let mut session = CameraSession::new(backend(config, native)?, config.camera.clone())
        .with_metrics(metrics);
    let facing = facing.unwrap_or(config.camera.default_facing);
    if let Err(e) = session.start(facing) {
        return Err(e.user_message().into());
    }

    if let Some(preview) = session.preview() {
        let resolution = preview
            .resolution
            .map_or_else(|| "unknown size".to_string(), |r| r.to_string());
        println!(
            "Previewing {} camera at {} (stream {}). Press Ctrl-C to stop.",
            preview.facing_mode, resolution, preview.stream_id
        );
    }

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    session.stop();
    println!("Camera released.");
    Ok(())
}

/// Print the effective configuration as TOML
pub fn print_config(config: &AppConfig) -> CliResult {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
