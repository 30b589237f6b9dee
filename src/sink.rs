//! Output sink abstraction.

/// Trait for abstracting the pixel output hardware.
///
/// Implement this for your LED driver (SPI, PWM/DMA, a terminal renderer, a
/// test recorder) to allow a strand to display its frames. Handle any
/// hardware errors internally - these methods cannot fail.
pub trait PixelSink {
    /// Stages pixel `index` to the given 8-bit color, in (r, g, b) order.
    fn set_pixel(&mut self, index: usize, rgb: [u8; 3]);

    /// Pushes every staged pixel to the hardware.
    fn flush(&mut self);

    /// Number of physical pixels the sink can address.
    fn pixel_count(&self) -> usize;
}

impl<S: PixelSink + ?Sized> PixelSink for &mut S {
    fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        (**self).set_pixel(index, rgb);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn pixel_count(&self) -> usize {
        (**self).pixel_count()
    }
}

impl<S: PixelSink + ?Sized> PixelSink for Box<S> {
    fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        (**self).set_pixel(index, rgb);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn pixel_count(&self) -> usize {
        (**self).pixel_count()
    }
}
