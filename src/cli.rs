use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wedding-snap",
    about = "Share wedding photos with the couple",
    long_about = "wedding-snap takes the photos a guest picked, checks that they are images of a \
                  reasonable size, recompresses them to JPEG and uploads them one by one to the \
                  couple's media host, retrying once when an upload fails.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    wedding-snap upload IMG_0012.jpg IMG_0013.png --guest \"Aunt Mary\"\n  \
    wedding-snap upload ./reception -r\n  \
    wedding-snap check \"./phone/*.jpg\"\n  \
    wedding-snap compress portrait.png portrait.jpg -q 0.7"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print every attempt and compression result")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Upload photos to the media host",
        long_about = "Validate the given photos, recompress them and upload them in order. \
                      At most 10 photos of up to 10 MB each can be shared at once. \
                      The whole run stops at the first photo that fails twice."
    )]
    Upload {
        #[arg(required = true, help = "Photo files, directories or glob patterns")]
        inputs: Vec<String>,

        #[arg(
            short = 'g',
            long,
            default_value = "",
            help = "Your name, attached to every photo (empty = anonymous)"
        )]
        guest: String,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            long,
            env = "WEDDING_SNAP_ENDPOINT",
            help = "Full upload endpoint URL",
            long_help = "Override the upload endpoint entirely. Takes precedence over --cloud-name."
        )]
        endpoint: Option<String>,

        #[arg(
            long,
            env = "WEDDING_SNAP_CLOUD_NAME",
            help = "Media host account name",
            long_help = "Cloud name used to build the default upload endpoint. \
                         Default: wedding-snap"
        )]
        cloud_name: Option<String>,

        #[arg(
            long,
            env = "WEDDING_SNAP_UPLOAD_PRESET",
            help = "Unsigned upload preset",
            long_help = "Upload preset sent with every photo. Default: wedding_guests"
        )]
        upload_preset: Option<String>,
    },

    #[command(
        about = "Check which photos would be accepted",
        long_about = "Run the same checks as upload without compressing or sending anything."
    )]
    Check {
        #[arg(required = true, help = "Photo files, directories or glob patterns")]
        inputs: Vec<String>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(
        about = "Recompress a single photo to JPEG",
        long_about = "Re-encode a photo at its native resolution the same way photos are \
                      prepared for upload."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output JPEG file path")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            default_value_t = crate::constants::UPLOAD_QUALITY,
            help = "Quality between 0 (exclusive) and 1"
        )]
        quality: f32,
    },
}
