mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use glam::Vec3;
use voxcraft_core::{BlockId, BlockType, ChunkId};
use voxcraft_persist::{CameraState, ChunkStore, Store};
use voxcraft_world::World;

use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "voxcraft", about = "Inspect and edit a persisted voxel world")]
struct Cli {
    /// RON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store file; overrides the settings file. Pass "" for an in-memory store.
    #[arg(long)]
    db: Option<String>,

    /// Render radius in chunks; overrides the settings file.
    #[arg(long)]
    radius: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the persisted camera, or overwrite it with --set.
    Camera {
        #[arg(long, num_args = 5, value_names = ["X", "Y", "Z", "RX", "RY"], allow_negative_numbers = true)]
        set: Option<Vec<f32>>,
    },
    /// Load every chunk within the render radius of the camera.
    Warm,
    /// Read or edit a single block.
    Block {
        #[command(subcommand)]
        action: BlockAction,
    },
    /// Cast a ray from the camera along its facing direction.
    Ray,
    /// Print store statistics.
    Stats {
        /// Also list every persisted chunk id.
        #[arg(long)]
        list: bool,
    },
}

#[derive(Debug, Subcommand)]
enum BlockAction {
    #[command(allow_negative_numbers = true)]
    Get { x: i32, y: i32, z: i32 },
    #[command(allow_negative_numbers = true)]
    Set {
        x: i32,
        y: i32,
        z: i32,
        #[arg(value_name = "TYPE")]
        block_type: u16,
    },
    #[command(allow_negative_numbers = true)]
    Del { x: i32, y: i32, z: i32 },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(db) = cli.db {
        settings.db_path = PathBuf::from(db);
    }
    if let Some(radius) = cli.radius {
        settings.world.render_radius = radius;
    }
    settings.validate()?;

    let store = if settings.in_memory() {
        log::info!("using in-memory store");
        Arc::new(Store::in_memory()?)
    } else {
        Arc::new(
            Store::open(&settings.db_path)
                .with_context(|| format!("opening {}", settings.db_path.display()))?,
        )
    };
    let mut camera = store.camera()?;

    let world = World::new(store.clone() as Arc<dyn ChunkStore>, &settings.world);
    log::info!("world cache holds {} chunks", world.capacity());

    let result = run(&cli.command, &world, &store, &settings, &mut camera);
    drop(world);

    store.put_camera(&camera)?;
    match Arc::try_unwrap(store) {
        Ok(store) => store.close()?,
        Err(_) => log::warn!("store still shared at shutdown, skipping explicit close"),
    }
    result
}

fn run(
    command: &Command,
    world: &World,
    store: &Store,
    settings: &Settings,
    camera: &mut CameraState,
) -> anyhow::Result<()> {
    match command {
        Command::Camera { set } => {
            if let Some(values) = set {
                let [x, y, z, rot_x, rot_y] = values[..] else {
                    bail!("--set takes exactly five values");
                };
                *camera = CameraState {
                    position: Vec3::new(x, y, z),
                    rot_x,
                    rot_y,
                };
            }
            println!(
                "camera at {} rot_x {} rot_y {}",
                camera.position, camera.rot_x, camera.rot_y
            );
        }
        Command::Warm => {
            let center = BlockId::nearest(camera.position).chunk_id();
            let ids = World::chunks_around(center, settings.world.render_radius);
            let chunks = world.chunks(&ids);
            let blocks: usize = chunks.iter().map(|c| c.block_count()).sum();
            println!(
                "loaded {}/{} chunks around {center}, {blocks} blocks",
                chunks.len(),
                ids.len()
            );
        }
        Command::Block { action } => run_block(action, world)?,
        Command::Ray => {
            let center = BlockId::nearest(camera.position).chunk_id();
            world.chunks(&neighborhood(center));
            let dir = facing(camera);
            match world.hit_test(camera.position, dir) {
                Some(hit) => {
                    let block_type = world.block(hit.block);
                    match hit.previous {
                        Some(previous) => {
                            println!("hit {} (type {}) from {previous}", hit.block, block_type.0)
                        }
                        None => println!("hit {} (type {}) at origin", hit.block, block_type.0),
                    }
                }
                None => println!("no block within reach"),
            }
        }
        Command::Stats { list } => {
            println!("{} chunks persisted", store.chunk_count()?);
            println!("{} chunks cached", world.cached_chunk_count());
            if *list {
                for id in store.chunk_ids()? {
                    println!("  {id}");
                }
            }
        }
    }
    Ok(())
}

fn run_block(action: &BlockAction, world: &World) -> anyhow::Result<()> {
    match *action {
        BlockAction::Get { x, y, z } => {
            let block = BlockId::new(x, y, z);
            if world.chunk(block.chunk_id()).is_none() {
                bail!("chunk {} is unavailable", block.chunk_id());
            }
            let block_type = world.block(block);
            println!(
                "{block}: type {} obstacle={} transparent={}",
                block_type.0,
                block_type.is_obstacle(),
                block_type.is_transparent()
            );
        }
        BlockAction::Set {
            x,
            y,
            z,
            block_type,
        } => {
            let block = BlockId::new(x, y, z);
            world.set_block(block, BlockType(block_type))?;
            println!("{block} = {block_type}");
        }
        BlockAction::Del { x, y, z } => {
            let block = BlockId::new(x, y, z);
            world.set_block(block, BlockType::AIR)?;
            println!("{block} cleared");
        }
    }
    Ok(())
}

/// Unit vector the camera looks along. Angles are in degrees: `rot_x` is yaw
/// and `rot_y` is pitch.
fn facing(camera: &CameraState) -> Vec3 {
    let (yaw, pitch) = (camera.rot_x.to_radians(), camera.rot_y.to_radians());
    Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
}

/// The chunk at `center` and its 26 neighbours, enough to cover any ray.
fn neighborhood(center: ChunkId) -> Vec<ChunkId> {
    let mut ids = Vec::with_capacity(27);
    for dy in -1..=1 {
        ids.extend(World::chunks_around(
            ChunkId::new(center.x, center.y + dy, center.z),
            1,
        ));
    }
    ids
}
