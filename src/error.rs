use quick_error::quick_error;
use std::io;
use std::num::TryFromIntError;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        NoFrames {
            display("Found no usable frames to encode")
        }
        BadBudget {
            display("Target size must be greater than zero bytes")
        }
        BadColorCount(count: u16) {
            display("Color count {} is out of the supported 8-256 range", count)
        }
        BadDuration {
            display("Frame duration must be at least 1ms")
        }
        Gif(err: gif::EncodingError) {
            display("GIF encoding error: {}", err)
        }
        Io(err: io::Error) {
            from()
            from(_oom: std::collections::TryReserveError) -> (io::ErrorKind::OutOfMemory.into())
            display("I/O: {}", err)
        }
        WrongSize(msg: String) {
            display("{}", msg)
            from(e: TryFromIntError) -> (e.to_string())
            from(e: resize::Error) -> (e.to_string())
        }
        Quant(liq: imagequant::liq_error) {
            from()
            display("quantization error: {}", liq)
        }
    }
}

pub type GifResult<T, E = Error> = Result<T, E>;

impl From<gif::EncodingError> for Error {
    #[cold]
    fn from(err: gif::EncodingError) -> Self {
        match err {
            gif::EncodingError::Io(err) => err.into(),
            other => Error::Gif(other),
        }
    }
}
