//! Batch reading (`punchread read ...`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Args;
use punchread::{
    CardReader, CardReading, Channel, DuplexVerdict, FaceRecord, ReadRecord, RenderStyle, ReportWriter,
    compare_duplex, load_grid, render_overlay,
};
use rayon::prelude::*;

use crate::cli::common::ReaderArgs;
use crate::cli::utils::{ensure_dir, ensure_parent, overlay_path};

/// Args for `punchread read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Scans to read: front/back pairs, or single faces with `--single`.
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
    /// Treat every image as a separate card without a back face.
    #[arg(long)]
    pub single: bool,
    #[command(flatten)]
    pub reader: ReaderArgs,
    /// Directory for diagnostic overlay images.
    #[arg(long)]
    pub overlay: Option<PathBuf>,
    /// Append one JSON line per card to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Worker threads (default: one per CPU).
    #[arg(long)]
    pub jobs: Option<usize>,
}

struct Readers<'a> {
    front: CardReader,
    back: CardReader,
    channel: Channel,
    overlay: Option<&'a Path>,
}

struct Job<'a> {
    front: &'a Path,
    back: Option<&'a Path>,
}

enum Status {
    Read,
    Mismatch,
    Failed,
}

struct Outcome {
    status: Status,
    listing: String,
    record: ReadRecord,
}

/// Execute `punchread read`.
pub fn handle(args: ReadArgs) -> Result<()> {
    if !args.single && args.images.len() % 2 != 0 {
        return Err(anyhow!(
            "expected front/back pairs but got {} images (use --single for one face per card)",
            args.images.len()
        ));
    }
    let jobs: Vec<Job<'_>> = if args.single {
        args.images
            .iter()
            .map(|front| Job {
                front: front.as_path(),
                back: None,
            })
            .collect()
    } else {
        args.images
            .chunks(2)
            .map(|pair| Job {
                front: pair[0].as_path(),
                back: Some(pair[1].as_path()),
            })
            .collect()
    };

    if let Some(dir) = &args.overlay {
        ensure_dir(dir)?;
    }
    let readers = Readers {
        front: args.reader.reader(false)?,
        back: args.reader.reader(true)?,
        channel: args.reader.channel.into(),
        overlay: args.overlay.as_deref(),
    };

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = args.jobs {
        pool = pool.num_threads(n.max(1));
    }
    let pool = pool.build().context("failed to start worker threads")?;
    let outcomes: Vec<Outcome> =
        pool.install(|| jobs.par_iter().map(|job| process(job, &readers)).collect());

    let mut writer = match &args.report {
        Some(path) => {
            ensure_parent(path)?;
            Some(ReportWriter::append(path)?)
        }
        None => None,
    };
    let (mut read, mut mismatched, mut failed) = (0usize, 0usize, 0usize);
    for outcome in &outcomes {
        print!("{}", outcome.listing);
        match outcome.status {
            Status::Read => read += 1,
            Status::Mismatch => mismatched += 1,
            Status::Failed => failed += 1,
        }
        if let Some(writer) = writer.as_mut() {
            writer.write(&outcome.record)?;
        }
    }
    if let Some(writer) = writer {
        writer.finish()?;
    }
    eprintln!(
        "{} cards: {} read, {} mismatched, {} failed",
        outcomes.len(),
        read,
        mismatched,
        failed
    );
    Ok(())
}

fn process(job: &Job<'_>, readers: &Readers<'_>) -> Outcome {
    let names = match job.back {
        Some(back) => format!("{} {}", job.front.display(), back.display()),
        None => job.front.display().to_string(),
    };
    match read_job(job, readers) {
        Ok((status, listing, record)) => Outcome {
            status,
            listing,
            record,
        },
        Err(err) => {
            log::warn!("{}: {:#}", names, err);
            let record = ReadRecord::new(face_record(job.front), job.back.map(face_record))
                .with_error(format!("{:#}", err));
            Outcome {
                status: Status::Failed,
                listing: format!("fail {:<80} {}\n", "", names),
                record,
            }
        }
    }
}

fn read_job(job: &Job<'_>, readers: &Readers<'_>) -> Result<(Status, String, ReadRecord)> {
    let front = read_face(&readers.front, job.front, readers)?;
    let front_face = FaceRecord::for_file(job.front)?;
    let mut listing = String::new();

    let Some(back_path) = job.back else {
        let record = ReadRecord::new(front_face, None).with_reading(&front);
        writeln!(listing, "{:<80} {}", front.decoded.listing(), job.front.display())?;
        return Ok((Status::Read, listing, record));
    };

    let back = read_face(&readers.back, back_path, readers)?;
    let verdict = compare_duplex(&front.pattern, &back.pattern);
    let record = ReadRecord::new(front_face, Some(FaceRecord::for_file(back_path)?))
        .with_reading(&front)
        .with_verdict(verdict.clone());
    writeln!(
        listing,
        "{:<4} {:<80} {} {}",
        verdict.label(),
        front.decoded.listing(),
        job.front.display(),
        back_path.display()
    )?;
    let status = match verdict {
        DuplexVerdict::Good => Status::Read,
        DuplexVerdict::Bad { .. } => {
            push_dump(&mut listing, "# fs ", &front);
            push_dump(&mut listing, "# bs ", &back);
            Status::Mismatch
        }
    };
    Ok((status, listing, record))
}

fn read_face(reader: &CardReader, path: &Path, readers: &Readers<'_>) -> Result<CardReading> {
    let grid = load_grid(path, readers.channel, reader.config().polarity)?;
    let reading = reader
        .read(&grid)
        .with_context(|| format!("failed to read card {}", path.display()))?;
    if let Some(dir) = readers.overlay {
        let out = overlay_path(dir, path);
        render_overlay(&grid, &reading.diagnostics, reader.config())
            .save(&out)
            .with_context(|| format!("failed to write overlay {}", out.display()))?;
    }
    Ok(reading)
}

fn push_dump(listing: &mut String, prefix: &str, reading: &CardReading) {
    let dump = reading.pattern.render(RenderStyle::AsciiX, Some(&reading.decoded));
    for line in dump.lines() {
        listing.push_str(prefix);
        listing.push_str(line);
        listing.push('\n');
    }
}

fn face_record(path: &Path) -> FaceRecord {
    FaceRecord::for_file(path).unwrap_or_else(|_| FaceRecord {
        path: path.to_path_buf(),
        sha256: String::new(),
    })
}
