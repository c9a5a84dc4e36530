//! tricks-media: process and manage trick and avatar images from the shell.
//!
//! Media directories come from MEDIA_DIRECTORIES (`key=/abs/path,...`); see
//! `MediaConfig::from_env` for the other settings.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tricks_cli::{init_tracing, original_name, stored_extensions};
use tricks_core::MediaConfig;
use tricks_processing::{
    ImageUploader, ResizeFormat, UploadParameters, UploadValidator, UploadedFile,
};
use tricks_storage::MediaStore;

#[derive(Parser)]
#[command(name = "tricks-media", about = "Trick media CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop, resize and store an uploaded image
    Upload {
        /// Path to the uploaded file (it is moved, not copied)
        file: PathBuf,
        /// Media directory key, e.g. trick_image or user_avatar
        #[arg(long)]
        target: String,
        /// Label the stored name starts with
        #[arg(long)]
        label: String,
        /// Tag for the intermediate name
        #[arg(long, default_value = "original")]
        dimensions: String,
        /// Crop region as `[{"x":..,"y":..,"width":..,"height":..}]`
        #[arg(long)]
        crop: String,
        /// Output format: jpg, jpeg, png or gif
        #[arg(long)]
        extension: String,
        /// Target width in pixels
        #[arg(long)]
        width: u32,
        /// Target height in pixels
        #[arg(long)]
        height: u32,
    },
    /// Print the full path of a stored image
    Locate {
        #[arg(long)]
        target: String,
        /// Stored bare name (`label-hash-WxH`)
        stem: String,
    },
    /// Delete a stored image
    Delete {
        #[arg(long)]
        target: String,
        /// Stored bare name (`label-hash-WxH`)
        stem: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = MediaConfig::from_env().context("Load media configuration")?;
    config.validate().context("Invalid media configuration")?;
    let uploader = ImageUploader::from_config(&config);

    match cli.command {
        Commands::Upload {
            file,
            target,
            label,
            dimensions,
            crop,
            extension,
            width,
            height,
        } => {
            let mut upload = UploadedFile::new(&file);
            if let Some(name) = original_name(&file) {
                upload = upload.with_original_name(name);
            }
            let params = UploadParameters {
                identifier_name: label,
                dimensions_format: dimensions,
                crop_json_data: crop,
                extension,
                resize_format: ResizeFormat::new(width, height)?,
            };

            UploadValidator::from_config(&config)
                .validate_all(&upload, &params)
                .context("Upload rejected")?;

            match uploader.upload_async(upload, target, params).await? {
                Some(stored) => println!("{}", stored.stem()),
                None => bail!("Upload of {} could not be stored", file.display()),
            }
        }
        Commands::Locate { target, stem } => {
            let path = uploader
                .store()
                .locate(&target, &stem, &stored_extensions())?;
            println!("{}", path.display());
        }
        Commands::Delete { target, stem } => {
            let store = uploader.store();
            let path = store.locate(&target, &stem, &stored_extensions())?;
            let filename = original_name(&path)
                .with_context(|| format!("Invalid stored path {}", path.display()))?;
            store.remove(&target, &filename)?;
            tracing::info!(key = %target, name = %filename, "Deleted stored image");
        }
    }

    Ok(())
}
