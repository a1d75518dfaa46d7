//! Pull adapter turning a [`Decompressor`] into a [`StreamReader`].

use crate::buffer::InputBuffer;
use log::{debug, trace, warn};
use lumpio_core::FILTER_BUFFER_SIZE;
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{DecompressStatus, Decompressor, StreamReader};
use std::io;

/// A forward-only reader that decodes compressed data on demand.
///
/// The filter borrows its underlying reader for its whole lifetime and
/// pulls compressed bytes from it through a [`FILTER_BUFFER_SIZE`] input
/// buffer. Each [`read`](StreamReader::read) decodes until the request is
/// satisfied, the compressed stream ends, or a decode fault occurs.
///
/// A decode fault is latched: the failing call and every later call return
/// [`LumpioError::CorruptedData`]. Running out of input before the codec's
/// end marker is a decode fault too.
///
/// When a declared output size is set (raw LZMA), the filter ends the stream
/// once that many bytes have been produced, whatever the decoder reports,
/// and treats an earlier end of input as a decode fault.
pub struct DecompressReader<'a, R: ?Sized, D> {
    source: &'a mut R,
    decoder: D,
    input: InputBuffer,
    /// The underlying reader returned zero bytes.
    saw_eof: bool,
    finished: bool,
    fault: Option<String>,
    declared_size: Option<u64>,
    total_out: u64,
}

impl<'a, R: StreamReader + ?Sized, D: Decompressor> DecompressReader<'a, R, D> {
    /// Wrap `source` with `decoder`.
    pub fn with_decoder(source: &'a mut R, decoder: D) -> Self {
        Self {
            source,
            decoder,
            input: InputBuffer::new(FILTER_BUFFER_SIZE),
            saw_eof: false,
            finished: false,
            fault: None,
            declared_size: None,
            total_out: 0,
        }
    }

    /// End the stream after exactly `size` decoded bytes.
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Declared uncompressed size, if any.
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    /// Number of decoded bytes handed out so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// True once the stream has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// True once a decode fault has been latched.
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// The decoder engine.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    fn fill_buffer(&mut self) -> Result<()> {
        if self.input.is_full() {
            let err = LumpioError::corrupted(
                self.decoder.method(),
                "decoder made no progress on a full input buffer",
            );
            return Err(self.latch(err));
        }

        let (n, requested) = self.input.refill(&mut *self.source)?;
        trace!("{}: refilled {} of {} bytes", self.decoder.method(), n, requested);
        if n == 0 {
            self.saw_eof = true;
        }
        Ok(())
    }

    fn latch(&mut self, err: LumpioError) -> LumpioError {
        let message = match &err {
            LumpioError::CorruptedData { message, .. } => message.clone(),
            other => other.to_string(),
        };
        warn!("{}: latching decode fault: {}", self.decoder.method(), message);
        self.fault = Some(message);
        err
    }

    fn remaining_declared(&self, requested: usize) -> usize {
        match self.declared_size {
            Some(size) => {
                let left = size.saturating_sub(self.total_out);
                usize::try_from(left).map_or(requested, |left| left.min(requested))
            }
            None => requested,
        }
    }
}

impl<R: StreamReader + ?Sized, D: Decompressor> StreamReader for DecompressReader<'_, R, D> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(message) = &self.fault {
            return Err(LumpioError::corrupted(self.decoder.method(), message.clone()));
        }

        let want = self.remaining_declared(buf.len());
        if self.finished || want == 0 {
            return Ok(0);
        }

        let mut written = 0;
        while written < want {
            if self.input.is_empty() && !self.saw_eof {
                self.fill_buffer()?;
            }

            let step = self
                .decoder
                .decompress(self.input.pending(), &mut buf[written..want]);
            let (consumed, produced, status) = match step {
                Ok(step) => step,
                Err(err) => return Err(self.latch(err)),
            };

            self.input.consume(consumed);
            written += produced;
            self.total_out += produced as u64;

            if status == DecompressStatus::Done {
                debug!(
                    "{}: end of stream after {} bytes",
                    self.decoder.method(),
                    self.total_out
                );
                self.finished = true;
                break;
            }

            if consumed == 0 && produced == 0 {
                // The attempt after the last refill found nothing left to decode.
                if self.saw_eof {
                    if self.declared_size.is_none() && !self.decoder.is_finished() {
                        let err = LumpioError::corrupted(
                            self.decoder.method(),
                            "stream ended before end marker",
                        );
                        return Err(self.latch(err));
                    }
                    self.finished = true;
                    break;
                }
                self.fill_buffer()?;
            }
        }

        if let Some(size) = self.declared_size {
            if self.total_out >= size {
                self.finished = true;
            } else if written < want {
                let err = LumpioError::corrupted(
                    self.decoder.method(),
                    format!(
                        "stream ended after {} of {} declared bytes",
                        self.total_out, size
                    ),
                );
                return Err(self.latch(err));
            }
        }

        Ok(written)
    }
}

impl<R: StreamReader + ?Sized, D: Decompressor> io::Read for DecompressReader<'_, R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        StreamReader::read(self, buf).map_err(io::Error::from)
    }
}

impl<R: ?Sized, D: Decompressor> std::fmt::Debug for DecompressReader<'_, R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecompressReader")
            .field("method", &self.decoder.method())
            .field("saw_eof", &self.saw_eof)
            .field("finished", &self.finished)
            .field("fault", &self.fault)
            .field("declared_size", &self.declared_size)
            .field("total_out", &self.total_out)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source over an owned byte vector.
    struct Slices {
        data: Vec<u8>,
        pos: usize,
    }

    impl StreamReader for Slices {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Identity "codec": copies input to output, ends at a 0xFF marker.
    struct Passthrough {
        finished: bool,
    }

    impl Decompressor for Passthrough {
        fn decompress(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> Result<(usize, usize, DecompressStatus)> {
            let mut n = 0;
            while n < input.len() && n < output.len() {
                match input[n] {
                    0xFF => {
                        self.finished = true;
                        return Ok((n + 1, n, DecompressStatus::Done));
                    }
                    0xEE => return Err(LumpioError::corrupted("copy", "bad byte")),
                    byte => output[n] = byte,
                }
                n += 1;
            }
            let status = if n == output.len() {
                DecompressStatus::NeedsOutput
            } else {
                DecompressStatus::NeedsInput
            };
            Ok((n, n, status))
        }

        fn is_finished(&self) -> bool {
            self.finished
        }

        fn method(&self) -> &'static str {
            "copy"
        }
    }

    fn source(data: &[u8]) -> Slices {
        Slices {
            data: data.to_vec(),
            pos: 0,
        }
    }

    #[test]
    fn test_ends_at_marker() {
        let mut src = source(&[1, 2, 3, 0xFF, 9, 9]);
        let mut reader = DecompressReader::with_decoder(&mut src, Passthrough { finished: false });
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert!(reader.is_finished());
        assert!(reader.decoder().is_finished());
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_marker_after_several_refills() {
        let mut data: Vec<u8> = (0..10_000u32).map(|i| (i % 200) as u8).collect();
        data.push(0xFF);
        let mut src = source(&data);
        let mut reader = DecompressReader::with_decoder(&mut src, Passthrough { finished: false });
        let mut out = Vec::new();
        let mut buf = [0u8; 333];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, &data[..10_000]);
        assert_eq!(reader.total_out(), 10_000);
        assert!(reader.is_finished());
    }

    #[test]
    fn test_input_exhausted_before_marker_faults() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 200) as u8).collect();
        let mut src = source(&data);
        let mut reader = DecompressReader::with_decoder(&mut src, Passthrough { finished: false });
        let mut out = Vec::new();
        let mut buf = [0u8; 333];
        let err = loop {
            match reader.read(&mut buf) {
                Ok(n) => {
                    assert!(n > 0, "end of stream reported without a marker");
                    out.extend_from_slice(&buf[..n]);
                }
                Err(err) => break err,
            }
        };
        assert!(err.is_decode());
        assert!(err.to_string().contains("end marker"));
        assert!(reader.is_faulted());
        assert!(data.starts_with(&out));
        assert!(reader.read(&mut buf).unwrap_err().is_decode());
    }

    #[test]
    fn test_fault_is_latched() {
        let mut src = source(&[1, 2, 0xEE, 3]);
        let mut reader = DecompressReader::with_decoder(&mut src, Passthrough { finished: false });
        let mut buf = [0u8; 4];
        assert!(reader.read(&mut buf).unwrap_err().is_decode());
        assert!(reader.is_faulted());
        assert!(reader.read(&mut buf).unwrap_err().is_decode());
    }

    #[test]
    fn test_declared_size_truncates() {
        let mut src = source(&[1, 2, 3, 4, 5, 6]);
        let mut reader =
            DecompressReader::with_decoder(&mut src, Passthrough { finished: false }).with_declared_size(4);
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_declared_size_overrun_faults() {
        let mut src = source(&[1, 2, 3]);
        let mut reader =
            DecompressReader::with_decoder(&mut src, Passthrough { finished: false }).with_declared_size(5);
        let mut buf = [0u8; 16];
        assert!(reader.read(&mut buf).unwrap_err().is_decode());
    }
}
