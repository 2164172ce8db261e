use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wedding_snap::cli::{Args, Commands};
use wedding_snap::constants::{CELEBRATION_PREFIX, INTERRUPTED_EXIT_CODE, SUCCESS_PREFIX};
use wedding_snap::progress::progress_channel;
use wedding_snap::utils::create_upload_bar;
use wedding_snap::{
    collect_candidate_paths, compress_file, error, info, logger, run_batch_with_cancel, warn,
    BatchOutcome, CandidateFile, Destination, HttpUploadClient, ProgressEvent, Quality,
    Rejection, RetryingUploader, Session, ShareError,
};

fn main() {
    let args = Args::parse();
    logger::set_verbosity(logger::Verbosity::from_flags(args.quiet, args.verbose));

    let result = match args.command {
        Commands::Upload {
            inputs,
            guest,
            recursive,
            endpoint,
            cloud_name,
            upload_preset,
        } => Destination::new(endpoint, cloud_name, upload_preset)
            .map_err(anyhow::Error::from)
            .and_then(|destination| upload(&inputs, guest, recursive, destination)),
        Commands::Check { inputs, recursive } => check(&inputs, recursive),
        Commands::Compress {
            input,
            output,
            quality,
        } => compress(&input, &output, quality),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn gather_candidates(inputs: &[String], recursive: bool) -> anyhow::Result<Vec<CandidateFile>> {
    let mut candidates = Vec::new();
    for input in inputs {
        for path in collect_candidate_paths(input, recursive)? {
            candidates.push(
                CandidateFile::from_path(&path)
                    .with_context(|| format!("Failed to read {:?}", path))?,
            );
        }
    }
    Ok(candidates)
}

fn print_rejections(rejections: &[Rejection]) {
    if rejections.is_empty() {
        return;
    }
    warn!("Skipped {} file(s):", rejections.len());
    for rejection in rejections {
        warn!("  {}", rejection);
    }
}

fn check(inputs: &[String], recursive: bool) -> anyhow::Result<()> {
    let mut session = Session::new();
    let rejections = session.add_files(gather_candidates(inputs, recursive)?);

    info!("📋 {} photo(s) ready to share:", session.pending().len());
    for image in session.pending() {
        info!("  {} {}", SUCCESS_PREFIX, image);
    }
    print_rejections(&rejections);
    Ok(())
}

fn compress(input: &Path, output: &Path, quality: f32) -> anyhow::Result<()> {
    let quality = Quality::new(quality)?;
    compress_file(input, output, quality)?;
    Ok(())
}

/// First Ctrl-C stops the batch after the photo in flight; a second one quits immediately.
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    warn!("Stopping after the current photo... press Ctrl-C again to quit now");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        error!("Interrupted");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
}

fn upload(
    inputs: &[String],
    guest: String,
    recursive: bool,
    destination: Destination,
) -> anyhow::Result<()> {
    let mut session = Session::with_guest(guest);
    let rejections = session.add_files(gather_candidates(inputs, recursive)?);
    print_rejections(&rejections);
    if session.pending().is_empty() {
        return Err(ShareError::EmptyBatch.into());
    }

    info!(
        "📤 Sharing {} photo(s) as {}",
        session.pending().len(),
        session.display_name()
    );
    info!("🔗 Endpoint: {}", destination.endpoint);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    let outcome = runtime.block_on(async {
        let uploader = RetryingUploader::new(HttpUploadClient::new(destination)?);
        let (tx, mut rx) = progress_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(watch_interrupts(cancel.clone()));

        let display = tokio::spawn(async move {
            let bar = create_upload_bar();
            while let Some(event) = rx.recv().await {
                match event {
                    ProgressEvent::Reset => bar.set_position(0),
                    ProgressEvent::Progress(pct) => bar.set_position(pct as u64),
                    ProgressEvent::Started {
                        index,
                        total,
                        file_name,
                    } => bar.set_message(format!("{}/{} {}", index + 1, total, file_name)),
                    ProgressEvent::Retrying { attempt, .. } => {
                        bar.set_message(format!("retrying (attempt {})", attempt))
                    }
                    ProgressEvent::ImageUploaded { .. } | ProgressEvent::Celebrate => {}
                    ProgressEvent::Finished(_) => break,
                }
            }
            bar.finish_and_clear();
        });

        let result = run_batch_with_cancel(&mut session, &uploader, &tx, &cancel).await;
        drop(tx);
        let _ = display.await;
        result
    })?;

    match outcome {
        BatchOutcome::Succeeded { .. } => {
            info!("{} {}", CELEBRATION_PREFIX, session.status());
            Ok(())
        }
        BatchOutcome::Cancelled { completed } => {
            anyhow::bail!("{} ({} photo(s) were already shared)", session.status(), completed)
        }
        BatchOutcome::Failed { .. } => anyhow::bail!("{}", session.status()),
    }
}
