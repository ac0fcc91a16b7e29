//! Standalone debug entry for the launch pipeline, used without any
//! GUI: resolve a version, download everything, spawn the game, and
//! exit with the game's own exit code.
//!
//! ```text
//! craftbox --version 1.20.1 --instanceDir ~/game \
//!     --launchArgs --username Steve --width 1280 --height 720
//! ```

use std::process::exit;

use cb_client::{launch, Instance, LaunchArgs, LauncherConfig};
use cb_core::{err, info, logger_finish};

struct CliArgs {
    version: String,
    instance_dir: String,
    launch_args: Vec<String>,
}

fn parse_cli(mut args: impl Iterator<Item = String>) -> Option<CliArgs> {
    let mut version = None;
    let mut instance_dir = None;
    let mut launch_args = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" => version = args.next(),
            "--instanceDir" => instance_dir = args.next(),
            // Everything after this flag belongs to the game.
            "--launchArgs" => {
                launch_args.extend(args);
                break;
            }
            "--help" | "-h" => {
                print_help();
                exit(0);
            }
            _ => {
                err!("Unknown argument: {arg}");
                print_help();
                return None;
            }
        }
    }

    let (Some(version), Some(instance_dir)) = (version, instance_dir) else {
        err!("Both --version and --instanceDir are required");
        print_help();
        return None;
    };

    Some(CliArgs {
        version,
        instance_dir,
        launch_args,
    })
}

fn print_help() {
    println!(
        r"Usage: craftbox --version <id> --instanceDir <path> [--launchArgs <args>...]

Options:
    --version <id>         Version id to resolve and launch
    --instanceDir <path>   Working directory for the game process
    --launchArgs <args>    Remaining arguments, passed through to the
                           launch configuration (--username, --width,
                           --height, --demo, --accessToken, ...)
    --help, -h             Show this help"
    );
}

#[tokio::main]
async fn main() {
    let Some(cli) = parse_cli(std::env::args().skip(1)) else {
        logger_finish();
        exit(2);
    };

    let launch_args = match LaunchArgs::parse(&cli.launch_args) {
        Ok(n) => n,
        Err(e) => {
            err!("{e}");
            logger_finish();
            exit(2);
        }
    };

    let config = match LauncherConfig::from_system_dirs() {
        Ok(n) => n,
        Err(e) => {
            err!("{e}");
            logger_finish();
            exit(1);
        }
    };

    let instance = Instance::new(&cli.instance_dir, &cli.version);

    let mut process = match launch(&config, &instance, &launch_args, None).await {
        Ok(n) => n,
        Err(e) => {
            err!("{e}");
            logger_finish();
            exit(1);
        }
    };

    let code = match process.wait().await {
        Ok(status) => {
            info!("Game exited with {status}");
            status.code().unwrap_or(1)
        }
        Err(e) => {
            err!("{e}");
            1
        }
    };

    drop(process);
    logger_finish();
    exit(code);
}
