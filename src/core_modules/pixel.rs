// THEORY:
// The `Pixel` module is the most fundamental unit of the engine. It is a "dumb"
// data container for a single RGBA pixel plus the handful of single-pixel
// heuristics the mask stage needs to decide foreground from background.
//
// Key architectural principles:
// 1.  **Single-pixel scope**: Nothing here looks at neighbors. Connectivity lives
//     in `cluster_finder`, not in the pixel.
// 2.  **Byte-level interop**: A pixel converts to and from a 4-byte RGBA slice so
//     that a raw frame buffer can be walked in `chunks(4)` without copying through
//     an intermediate representation.
// 3.  **The eviction sentinel**: `Pixel::EVICTED` is the fully transparent green
//     used to mark background and discarded clusters. Both the mask stage and the
//     recolor stage write it, so it is defined once here.

pub mod pixel {
    use serde::Deserialize;

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type Luminance = f64;

    pub const CHANNELS: usize = 4;

    /// A single RGBA pixel, 8 bits per channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    impl Pixel {
        /// Fully transparent green. Marks background cells and evicted clusters.
        pub const EVICTED: Pixel = Pixel::new(0, 255, 0, 0);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// An opaque pixel (alpha = 255).
        pub const fn opaque(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, 255)
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299 * self.red as f64 + 0.587 * self.green as f64 + 0.114 * self.blue as f64
        }

        /// Reads the intensity proxy selected by `channel`.
        /// Luminance is rounded to the nearest byte so every channel compares on the same scale.
        pub fn intensity(&self, channel: IntensityChannel) -> Channel {
            match channel {
                IntensityChannel::Red => self.red,
                IntensityChannel::Green => self.green,
                IntensityChannel::Blue => self.blue,
                IntensityChannel::Alpha => self.alpha,
                IntensityChannel::Luminance => self.luminance().round().clamp(0.0, 255.0) as Channel,
            }
        }

        pub fn is_opaque(&self) -> bool {
            self.alpha == 255
        }

        pub fn to_array(self) -> [Byte; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }
    }

    /// The channel compared against the threshold when building a mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum IntensityChannel {
        /// The first channel of the pixel. Matches the classic cutout behavior.
        #[default]
        Red,
        Green,
        Blue,
        Alpha,
        /// Rec. 601 luma of R, G and B.
        Luminance,
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            vec![pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            Pixel::from(rgba.0)
        }
    }

    impl From<Pixel> for image::Rgba<u8> {
        fn from(pixel: Pixel) -> Self {
            image::Rgba(pixel.to_array())
        }
    }
}
