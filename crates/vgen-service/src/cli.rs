//! Command-line arguments for the `vgen` binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use vgen_models::VideoShape;

#[derive(Debug, Parser)]
#[command(name = "vgen")]
#[command(version, about = "Generate a video and deliver it to a chat", long_about = None)]
#[command(group(ArgGroup::new("shape").args(["landscape", "portrait"])))]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, env = "VGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Landscape framing
    #[arg(long)]
    pub landscape: bool,

    /// Portrait framing
    #[arg(long)]
    pub portrait: bool,

    /// Print configured models and exit
    #[arg(long)]
    pub list_models: bool,

    /// User receiving the video
    #[arg(long, env = "VGEN_TARGET_USER")]
    pub user: Option<String>,

    /// Deliver to this group instead of the user
    #[arg(long, env = "VGEN_TARGET_GROUP")]
    pub group: Option<String>,

    /// Image file for image-to-video
    #[arg(long, env = "VGEN_INPUT_IMAGE")]
    pub image: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "VGEN_METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Video description
    #[arg(trailing_var_arg = true)]
    pub prompt: Vec<String>,
}

impl Cli {
    pub fn shape(&self) -> VideoShape {
        if self.landscape {
            VideoShape::Landscape
        } else if self.portrait {
            VideoShape::Portrait
        } else {
            VideoShape::Default
        }
    }

    pub fn prompt(&self) -> String {
        self.prompt.join(" ")
    }
}
