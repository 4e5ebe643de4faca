//! Hardware abstraction traits

use crate::error::TransportError;
use crate::frame::Frame;
use crate::model::Reading;

/// Synchronous exchange of one request frame for one reply frame
pub trait Transport {
    fn exchange(&mut self, request: &Frame) -> Result<Frame, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn exchange(&mut self, request: &Frame) -> Result<Frame, TransportError> {
        (**self).exchange(request)
    }
}

/// Destination of finished readings (log, metrics, network...)
pub trait ReadingSink {
    fn report(&mut self, reading: &Reading);
}

impl<S: ReadingSink + ?Sized> ReadingSink for &mut S {
    fn report(&mut self, reading: &Reading) {
        (**self).report(reading)
    }
}
