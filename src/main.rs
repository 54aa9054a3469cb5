#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The veilsound CLI requires the \"cli\" feature. Rebuild with `--features cli` to enable it."
    );
}

#[cfg(feature = "cli")]
mod cli {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{bail, Context};
    use clap::{Args, Parser, Subcommand};
    use tracing::info;
    use tracing_subscriber::EnvFilter;
    use veilsound::{AssetCatalog, AudioConfig, BackendKind, PlaybackSession, SoundSet, StopSignal};

    /// Procedurally generated sound effects and ambience
    #[derive(Parser, Debug)]
    #[command(name = "veilsound", version, about)]
    struct Cli {
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Render every sound of a set to WAV files
        Render {
            /// Sound set to render (game or menu)
            #[arg(long, default_value = "game", value_parser = parse_set)]
            set: SoundSet,
            /// Output directory (defaults to a temporary directory)
            #[arg(long)]
            out: Option<PathBuf>,
        },
        /// Play one or more sounds and wait for each to finish
        Play {
            #[command(flatten)]
            session: SessionArgs,
            /// Sound names, played in order
            #[arg(required = true)]
            names: Vec<String>,
        },
        /// Loop the ambient track and trigger every effect once
        Demo {
            #[command(flatten)]
            session: SessionArgs,
            /// How long to keep the ambient loop running
            #[arg(long, default_value_t = 8.0)]
            seconds: f32,
        },
    }

    #[derive(Args, Debug)]
    struct SessionArgs {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Sound set override (game or menu)
        #[arg(long, value_parser = parse_set)]
        set: Option<SoundSet>,
        /// Backend override (auto, command, device, none)
        #[arg(long, value_parser = parse_backend)]
        backend: Option<BackendKind>,
    }

    impl SessionArgs {
        fn resolve(&self) -> anyhow::Result<AudioConfig> {
            let mut config = match &self.config {
                Some(path) => AudioConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => AudioConfig::default(),
            };
            if let Some(set) = self.set {
                config.sound_set = set;
            }
            if let Some(backend) = self.backend {
                config.backend = backend;
            }
            Ok(config)
        }
    }

    fn parse_set(value: &str) -> Result<SoundSet, String> {
        SoundSet::from_name(value).ok_or_else(|| format!("unknown sound set '{}'", value))
    }

    fn parse_backend(value: &str) -> Result<BackendKind, String> {
        BackendKind::from_name(value).ok_or_else(|| format!("unknown backend '{}'", value))
    }

    fn render(set: SoundSet, out: Option<PathBuf>) -> anyhow::Result<()> {
        let keep = out.is_some();
        let catalog = match out {
            Some(dir) => AssetCatalog::in_dir(set, dir)?,
            None => AssetCatalog::new(set)?,
        };
        let generated = catalog.generate_all().context("generating audio assets")?;

        println!("Sound set: {}", set);
        println!("Directory: {}\n", catalog.dir().display());
        for asset in &generated {
            println!(
                "  {:<14} {:>6.2}s  {}",
                asset.name,
                asset.duration_secs(),
                asset.path.display()
            );
        }
        if !keep {
            println!("\n(temporary directory is removed on exit; pass --out to keep the files)");
        }
        Ok(())
    }

    fn play(session: &SessionArgs, names: &[String]) -> anyhow::Result<()> {
        let config = session.resolve()?;
        let session = PlaybackSession::from_config(&config)?;
        info!(backend = session.backend_name(), "playing {} sound(s)", names.len());

        let mut failures = 0;
        for name in names {
            let started = Instant::now();
            match session.play_regenerated(name).join() {
                Ok(()) => println!("  {:<14} {:>6.2}s", name, started.elapsed().as_secs_f32()),
                Err(e) => {
                    failures += 1;
                    println!("  {:<14} skipped: {}", name, e);
                }
            }
        }
        if failures == names.len() {
            bail!("no sound could be played");
        }
        Ok(())
    }

    fn demo(session: &SessionArgs, seconds: f32) -> anyhow::Result<()> {
        if !seconds.is_finite() || seconds <= 0.0 {
            bail!("--seconds must be positive");
        }
        let config = session.resolve()?;
        let session = Arc::new(PlaybackSession::from_config(&config)?);
        let catalog = Arc::clone(session.catalog());
        let ambient = catalog.sound_set().ambient();

        println!(
            "Demo: set={} backend={} for {:.1}s",
            catalog.sound_set(),
            session.backend_name(),
            seconds
        );

        let stop = StopSignal::new();
        session.start_ambient_loop(stop.clone());

        let effects: Vec<&str> = catalog.names().filter(|n| *n != ambient).collect();
        let total = Duration::from_secs_f32(seconds);
        let spacing = total / (effects.len() as u32 + 1);
        let started = Instant::now();

        for name in effects {
            if started.elapsed() >= total {
                break;
            }
            println!("  trigger {}", name);
            let _ = session.play_regenerated(name);
            std::thread::sleep(spacing);
        }
        if let Some(rest) = total.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }

        session.halt_ambient_loop();
        println!(
            "Ambient cycles: {} (state {:?})",
            session.ambient_cycles(),
            session.ambient_state()
        );
        Ok(())
    }

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();

        match Cli::parse().command {
            Command::Render { set, out } => render(set, out),
            Command::Play { session, names } => play(&session, &names),
            Command::Demo { session, seconds } => demo(&session, seconds),
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
