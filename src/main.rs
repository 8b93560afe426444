use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use azure_node_images::cache::ImageCache;
use azure_node_images::config::Settings;
use azure_node_images::gallery::{CommunityGalleryLister, SharedGalleryLister, build_client};
use azure_node_images::imagefamily::FipsMode;
use azure_node_images::provider::{
    NodeClass, NodeImage, NodeImageProvider, StaticKubernetesVersion, select_image,
};
use azure_node_images::requirements::{Architecture, HyperVGeneration, InstanceCapabilities};

const CONFIG_ENV: &str = "AZURE_NODE_IMAGES_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve AKS node images for a node class")]
struct Cli {
    /// JSON settings file; falls back to JSON in $AZURE_NODE_IMAGES_CONFIG
    #[arg(long, env = "AZURE_NODE_IMAGES_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Image family, e.g. Ubuntu2204, Ubuntu2404, AzureLinux
    #[arg(long)]
    family: Option<String>,

    /// Require FIPS certified images (shared gallery only)
    #[arg(long)]
    fips: bool,

    /// Resolve through the shared image gallery; defaults to the settings value
    #[arg(long)]
    use_sig: Option<bool>,

    /// Cluster Kubernetes version, e.g. v1.32.0
    #[arg(long, env = "KUBERNETES_VERSION")]
    kubernetes_version: String,

    /// Instance architecture to select an image for
    #[arg(long)]
    arch: Option<Architecture>,

    /// Hypervisor generations the instance supports (repeatable)
    #[arg(long = "generation")]
    generations: Vec<HyperVGeneration>,

    /// Bearer token for management calls
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("load settings from {}", path.display())),
        None => Settings::from_env(CONFIG_ENV)
            .with_context(|| format!("load settings from ${CONFIG_ENV}")),
    }
}

/// A tiny wrapper to render the resolved images cleanly
fn print_images(node_class: &NodeClass, kubernetes_version: &str, images: &[NodeImage]) {
    println!("\n=== Node images ===");
    println!("Family:     {}", node_class.image_family.as_deref().unwrap_or("<default>"));
    println!("FIPS:       {:?}", node_class.fips_mode);
    println!("SIG:        {}", node_class.use_sig);
    println!("Kubernetes: {kubernetes_version}");
    for (i, image) in images.iter().enumerate() {
        let req = image.requirements();
        println!(
            "  {i}: [{} gen{}] {}",
            req.architecture(),
            req.hyperv_generation(),
            image.id()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("azure_node_images=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli)?;
    if cli.access_token.is_some() {
        settings.set_access_token(cli.access_token.clone());
    }

    let client = build_client(settings.http_timeout()).context("build http client")?;
    let endpoint = settings.management_url()?;

    let community = CommunityGalleryLister::new(
        client.clone(),
        endpoint.clone(),
        settings.subscription_id(),
        settings.community_api_version(),
        settings.access_token().map(str::to_string),
    );
    let shared = SharedGalleryLister::new(
        client,
        endpoint,
        settings.node_image_api_version(),
        settings.access_token().map(str::to_string),
    );

    let cache = Arc::new(ImageCache::new(settings.cache_ttl()));
    let _sweeper = cache.spawn_sweeper(settings.cache_sweep_interval());

    let provider = NodeImageProvider::new(
        settings.location(),
        settings.subscription_id(),
        settings.sig_subscription_id(),
        Arc::new(community),
        Arc::new(shared),
        Arc::new(StaticKubernetesVersion::parse(&cli.kubernetes_version)?),
        cache,
    );

    let node_class = NodeClass {
        image_family: cli.family.clone(),
        fips_mode: if cli.fips { FipsMode::Fips } else { FipsMode::Disabled },
        use_sig: cli.use_sig.unwrap_or(settings.use_sig()),
        kubernetes_version: None,
    };

    let images = provider
        .list(&node_class)
        .await
        .context("resolve node images")?;
    print_images(&node_class, &cli.kubernetes_version, &images);

    if let Some(arch) = cli.arch {
        let generations = if cli.generations.is_empty() {
            vec![HyperVGeneration::V1, HyperVGeneration::V2]
        } else {
            cli.generations.clone()
        };
        let capabilities = InstanceCapabilities::new(arch, generations);
        let selected = select_image(&images, &capabilities)
            .ok_or_else(|| anyhow!("no compatible image found for {arch} {capabilities:?}"))?;
        println!("\nSelected: {}", selected.id());
    }

    Ok(())
}
