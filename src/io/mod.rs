mod local;

pub use local::LocalFileReader;

/// Trait for random access reading from an archive source.
///
/// Extraction is single-threaded and blocking, so implementations take
/// `&self` and are expected to be cheap positioned reads (`pread`-style),
/// not stateful seeks.
pub trait ReadAt {
    /// Fill `buf` completely with data starting at `offset`.
    ///
    /// Short sources fail with `UnexpectedEof` rather than returning a
    /// partial read.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()>;

    /// Total size of the data source in bytes.
    fn size(&self) -> u64;
}
