use clap::Parser;
use docker_driver::configuration::{ContainerConfig, DriverConfig, PortPair};
use docker_driver::container_management::LifecycleDriver;
use log::{error, info, warn};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "lifecycle_demo")]
#[command(about = "Runs containers through their lifecycle on a Docker engine")]
struct Args {
    /// Optional TOML configuration file
    config_file: Option<String>,

    /// Engine address, overrides the configuration file
    #[arg(long, env = "DOCKER_HOST")]
    host: Option<String>,

    #[arg(long, default_value = "busybox")]
    image: String,
}

/// Containers described next to the driver settings, as `[[containers]]` tables.
#[derive(Deserialize, Default)]
struct DemoContainers {
    #[serde(default)]
    containers: Vec<ContainerConfig>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    let (mut config, demo) = match args.config_file.as_deref() {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config = DriverConfig::from_toml_str(&raw).map_err(|e| {
                error!("Unable to import configuration from file: {}", e);
                e
            })?;
            let demo: DemoContainers = toml::from_str(&raw)?;
            (config, demo)
        }
        None => (DriverConfig::default(), DemoContainers::default()),
    };
    if args.host.is_some() {
        config.engine.host = args.host;
        config.validate()?;
    }

    let driver = match LifecycleDriver::connect(&config).await {
        Ok(driver) => driver,
        Err(e) => {
            error!("Failed to connect to the engine (is Docker running?): {}", e);
            return Err(e.into());
        }
    };
    info!("Connected to the engine");

    info!("Running containers: {:?}", driver.list_running_containers().await?);

    let containers = if demo.containers.is_empty() {
        vec![ContainerConfig {
            image: args.image.clone(),
            port_pair: Some(PortPair::new("4812", "4821")),
            command: vec!["sleep".to_string(), "300".to_string()],
            memory_limit: 500_000_000,
            cpu_share: 0.5,
            ..Default::default()
        }]
    } else {
        demo.containers
    };

    let mut handles = Vec::new();
    for container in &containers {
        if let Some(digest) = driver.pull_image(&container.image).await? {
            info!("Image {} is at {}", container.image, digest);
        }
        let handle = driver.run(container).await?;
        info!("Started container {} from {}", handle, container.image);
        handles.push(handle);
    }
    info!("Running containers: {:?}", driver.list_running_containers().await?);

    for handle in &handles {
        match driver.check_health(handle).await {
            Ok(report) => info!(
                "Container {} uses {:.2}% CPU and {:.2}% of its memory limit",
                handle, report.cpu_percent, report.memory_percent
            ),
            Err(e) => warn!("Health check of {} failed: {}", handle, e),
        }
    }

    for handle in &handles {
        driver.stop(handle).await?;
        driver.remove(handle).await?;
        info!("Removed container {}", handle);
    }
    info!("Running containers: {:?}", driver.list_running_containers().await?);

    Ok(())
}
