use tokio::io::{AsyncRead, AsyncWrite};

pub trait ReadStream: AsyncRead + Unpin + Send + 'static {}

impl<T> ReadStream for T where T: AsyncRead + Unpin + Send + 'static {}

pub trait WriteStream: AsyncWrite + Unpin + Send + 'static {}

impl<T> WriteStream for T where T: AsyncWrite + Unpin + Send + 'static {}

pub(crate) type BoxedWriter = Box<dyn WriteStream>;
