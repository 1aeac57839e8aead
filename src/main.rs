use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use usd_arnold::prelude::*;

/// Translate the shading network connections of a USD text scene and print them.
#[derive(Parser, Debug)]
#[command(name = "usd-arnold")]
struct Args {
    /// Scene to translate
    #[arg(value_name = "scene.usda")]
    scene: PathBuf,

    /// Prim to read, may be repeated. Defaults to every material
    #[arg(long = "prim", value_name = "PATH")]
    prims: Vec<Path>,

    /// Attribute location holding the shading nodes
    #[arg(long, value_name = "LOCATION")]
    nodes_location: Option<String>,
}

/// Write the node groups a host import step would have produced.
fn seed(scene: &Scene, config: &TranslatorConfig, tree: &mut AttributeTree) {
    for prim in scene.prims_of_type("Shader") {
        let handle = PrimNameHandles.handle(prim);
        tree.set_attr(
            &format!("{}.type", config.node_location(&handle)),
            prim.type_name().into(),
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.scene)
        .with_context(|| format!("failed to read {}", args.scene.display()))?;
    let scene = Scene::from_usda(&text)
        .with_context(|| format!("failed to parse {}", args.scene.display()))?;

    let mut config = DEFAULT_CONFIG.clone();
    if let Some(location) = args.nodes_location {
        config.nodes_location = location;
    }

    let prims = if args.prims.is_empty() {
        scene
            .prims_of_type(&config.material_type)
            .map(|prim| prim.path().clone())
            .collect()
    } else {
        args.prims
    };

    let mut tree = AttributeTree::default();
    seed(&scene, &config, &mut tree);

    let mut total = Summary::default();
    let mut translator = Translator::new(&scene, &PrimNameHandles)
        .with_config(&config)
        .on_skip(|skip| warn!(%skip, "skipped"));

    for prim in prims.iter() {
        total += translator.read_prim_location(prim, &mut tree);
    }
    drop(translator);

    info!(
        visited = total.visited,
        committed = total.committed,
        edges = total.edges,
        skipped = total.skipped,
        "done"
    );

    let suffix = format!(".{}.", config.connections_key);
    for (key, value) in tree.root.flatten() {
        if !key.contains(&suffix) {
            continue;
        }
        if let Some(source) = value.as_str() {
            println!("{key} = {source}");
        }
    }

    Ok(())
}
