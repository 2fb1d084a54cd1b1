use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use log::{error, info, warn};

use platemesh::{
    input::{self, PlateInput},
    post_processor, MeshCache, MeshParams, PlateMeshError,
};

#[derive(Parser)]
#[command(name = "platemesh", about = "Structured quadrilateral meshes of rectangular plates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a mesh and optionally export it
    Generate {
        #[command(flatten)]
        plate: PlateArgs,

        /// Nodes output csv
        #[arg(long, requires = "elements_csv")]
        nodes_csv: Option<String>,

        /// Elements output csv
        #[arg(long, requires = "nodes_csv")]
        elements_csv: Option<String>,

        /// Whole mesh as json
        #[arg(long)]
        json: Option<String>,
    },
    /// Check the cached mesher against the reference mesher
    Verify {
        #[command(flatten)]
        plate: PlateArgs,
    },
    /// Verify every subdivision pair up to the given counts
    Sweep {
        #[arg(long)]
        length: f64,

        #[arg(long)]
        breadth: f64,

        #[arg(long)]
        max_nx: usize,

        #[arg(long)]
        max_ny: usize,
    },
}

#[derive(Args)]
struct PlateArgs {
    /// Input json with a "plate" section; flags override its values
    #[arg(long)]
    input: Option<String>,

    #[arg(long)]
    length: Option<f64>,

    #[arg(long)]
    breadth: Option<f64>,

    #[arg(long)]
    nx: Option<usize>,

    #[arg(long)]
    ny: Option<usize>,
}

impl PlateArgs {
    fn resolve(&self) -> Result<MeshParams, PlateMeshError> {
        let from_cli = PlateInput {
            length: self.length,
            breadth: self.breadth,
            nx: self.nx,
            ny: self.ny,
        };

        let merged = match &self.input {
            Some(path) => {
                let input_json = input::load_input_file(path)?;
                from_cli.or(input::parse_plate(&input_json)?)
            }
            None => from_cli,
        };

        merged.into_params()
    }
}

fn generate(
    plate: &PlateArgs,
    nodes_csv: Option<&str>,
    elements_csv: Option<&str>,
    json: Option<&str>,
) -> Result<bool, PlateMeshError> {
    let params = plate.resolve()?;
    let cache = MeshCache::new();

    let mesh = cache.generate_mesh(params.length, params.breadth, params.nx, params.ny)?;
    info!("mesh has {} nodes and {} elements", mesh.nnode, mesh.nel);

    if let (Some(nodes_csv), Some(elements_csv)) = (nodes_csv, elements_csv) {
        post_processor::csv_output(&mesh, nodes_csv, elements_csv)?;
    }
    if let Some(json) = json {
        post_processor::json_output(&mesh, json)?;
    }

    Ok(true)
}

fn verify(plate: &PlateArgs) -> Result<bool, PlateMeshError> {
    let params = plate.resolve()?;
    let cache = MeshCache::new();

    let start = Instant::now();
    let mesh = cache.generate_mesh(params.length, params.breadth, params.nx, params.ny)?;
    let cold = start.elapsed().as_secs_f32();

    let start = Instant::now();
    cache.generate_mesh(params.length, params.breadth, params.nx, params.ny)?;
    let warm = start.elapsed().as_secs_f32();

    let start = Instant::now();
    let reference =
        platemesh::generate_mesh_reference(params.length, params.breadth, params.nx, params.ny)?;
    let baseline = start.elapsed().as_secs_f32();

    info!(
        "mesher {:.6}s (cached {:.6}s), reference {:.6}s",
        cold, warm, baseline
    );

    let equivalent = platemesh::verify_mesh_equivalence(&mesh, &reference);
    if equivalent {
        info!("meshes are equivalent ({} nodes, {} elements)", mesh.nnode, mesh.nel);
    }

    Ok(equivalent)
}

fn sweep(length: f64, breadth: f64, max_nx: usize, max_ny: usize) -> Result<bool, PlateMeshError> {
    let cache = MeshCache::new();
    let mut failures: usize = 0;

    let bar = ProgressBar::new((max_nx * max_ny) as u64);
    for nx in 1..=max_nx {
        for ny in 1..=max_ny {
            bar.inc(1);

            let mesh = cache.generate_mesh(length, breadth, nx, ny)?;
            let reference = platemesh::generate_mesh_reference(length, breadth, nx, ny)?;

            if let Some(mismatch) = platemesh::find_mismatch(&mesh, &reference) {
                warn!("nx = {nx}, ny = {ny}: {mismatch}");
                failures += 1;
            }
        }
    }
    bar.finish();

    // the sweep holds every mesh it checked
    cache.clear();

    if failures > 0 {
        error!("{} of {} parameter sets diverged", failures, max_nx * max_ny);
        return Ok(false);
    }
    info!("all {} parameter sets are equivalent", max_nx * max_ny);

    Ok(true)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let outcome = match &cli.command {
        Command::Generate {
            plate,
            nodes_csv,
            elements_csv,
            json,
        } => generate(
            plate,
            nodes_csv.as_deref(),
            elements_csv.as_deref(),
            json.as_deref(),
        ),
        Command::Verify { plate } => verify(plate),
        Command::Sweep {
            length,
            breadth,
            max_nx,
            max_ny,
        } => sweep(*length, *breadth, *max_nx, *max_ny),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!("{err}");
            std::process::exit(2)
        }
    }
}
