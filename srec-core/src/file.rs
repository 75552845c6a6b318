//! File-backed encoding with optional CRC-32 header embedding
//!
//! Encoding a file is a two-phase run:
//! 1. [`FileEncoder`] writes the body (header text, data, count, termination)
//!    while accumulating the CRC-32 of the input, then closes the file.
//! 2. [`EncodedFile::embed_header`] splices the CRC-32 header in front of the
//!    closed file through a temporary file and a rename.
//!
//! The session moves `Open -> Finished -> HeaderEmbedded`; the second phase
//! reopens the file by path and never touches the phase-one handle.

use crate::encoder::{encode_stream, EncodeOptions, EncodeSummary, Encoder, SessionState};
use crate::error::SrecError;
use crate::header::embed_header;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Encoder session writing to a file on disk
pub struct FileEncoder {
    path: PathBuf,
    encoder: Encoder<BufWriter<File>>,
}

impl FileEncoder {
    /// Create or truncate `path` and open a session on it
    pub fn create(path: impl AsRef<Path>, options: &EncodeOptions) -> Result<Self, SrecError> {
        let path = path.as_ref().to_path_buf();
        options.validate()?;
        let file = File::create(&path)?;

        #[cfg(feature = "logging")]
        debug!("Created {}", path.display());

        let encoder = Encoder::with_options(BufWriter::new(file), options)?;
        Ok(Self { path, encoder })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying session
    pub fn encoder_mut(&mut self) -> &mut Encoder<BufWriter<File>> {
        &mut self.encoder
    }

    /// Write one data record
    pub fn write_data(&mut self, chunk: &[u8]) -> Result<(), SrecError> {
        self.encoder.write_data(chunk)
    }

    /// Write the count and termination records, flush and close the file
    pub fn finish(mut self) -> Result<EncodedFile, SrecError> {
        let summary = self.encoder.finish()?;
        let mut writer = self.encoder.into_inner();
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| SrecError::from(e.into_error()))?;
        file.sync_all()?;
        drop(file);

        Ok(EncodedFile {
            path: self.path,
            summary,
            state: SessionState::Finished,
        })
    }
}

/// A finished S-record file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    path: PathBuf,
    summary: EncodeSummary,
    state: SessionState,
}

impl EncodedFile {
    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Totals of the encoding run
    pub fn summary(&self) -> &EncodeSummary {
        &self.summary
    }

    /// `Finished` or `HeaderEmbedded`
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Prepend the CRC-32 header line
    ///
    /// Only valid once; a second call fails with [`SrecError::SessionClosed`].
    pub fn embed_header(self) -> Result<Self, SrecError> {
        if self.state != SessionState::Finished {
            return Err(SrecError::SessionClosed);
        }

        embed_header(&self.path, self.summary.crc)?;

        Ok(Self {
            state: SessionState::HeaderEmbedded,
            ..self
        })
    }
}

/// Encode everything from `reader` into a new S-record file at `output`
pub fn encode_to_file<R: Read>(
    reader: R,
    output: &Path,
    options: &EncodeOptions,
) -> Result<EncodedFile, SrecError> {
    let mut file = FileEncoder::create(output, options)?;
    encode_stream(reader, file.encoder_mut())?;
    let mut encoded = file.finish()?;

    if options.embed_crc {
        encoded = encoded.embed_header()?;
    }

    #[cfg(feature = "logging")]
    info!(
        "Wrote {} data records ({} bytes) to {}",
        encoded.summary.record_count,
        encoded.summary.data_bytes,
        encoded.path.display()
    );

    Ok(encoded)
}

/// Encode the binary file at `input` into an S-record file at `output`
pub fn encode_file(
    input: &Path,
    output: &Path,
    options: &EncodeOptions,
) -> Result<EncodedFile, SrecError> {
    let reader = File::open(input)?;
    encode_to_file(reader, output, options)
}
