//! Request fixtures shared by the benchmarks.

#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    bytes: &'static [u8],
}

impl Fixture {
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self {
        Self { name, bytes }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn bytes(&self) -> &'static [u8] {
        self.bytes
    }

    /// Splits the request into slices of at most `size` bytes, the way it might
    /// arrive from a socket.
    pub fn pieces(&self, size: usize) -> impl Iterator<Item = &'static [u8]> {
        self.bytes.chunks(size.max(1))
    }
}

pub const GET_SMALL: Fixture = Fixture::new("get_small", include_bytes!("../resources/request/get_small.txt"));
pub const GET_LARGE: Fixture = Fixture::new("get_large", include_bytes!("../resources/request/get_large.txt"));
pub const POST_JSON: Fixture = Fixture::new("post_json", include_bytes!("../resources/request/post_json.txt"));

pub fn fixtures() -> [Fixture; 3] {
    [GET_SMALL, GET_LARGE, POST_JSON]
}
