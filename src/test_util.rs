//! Helpers shared by unit tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use image::{DynamicImage, Rgba, RgbaImage};

/// Serve a single HTTP response on a random local port and return its URL.
pub fn serve_once(status: &'static str, body: Vec<u8>) -> String {
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(&body);
    serve_raw(response)
}

/// Answer a single request with `response` written verbatim, then close.
pub fn serve_raw(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let _ = stream.write_all(&response);
        let _ = stream.flush();
    });

    format!("http://{addr}/logo.png")
}

/// A small RGBA test image with a gradient and a hard edge.
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let edge = if x < width / 2 { 30 } else { 220 };
        Rgba([edge, (y * 255 / height.max(1)) as u8, 128, 255])
    });
    DynamicImage::ImageRgba8(img)
}

/// `sample_image` encoded as PNG bytes.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    sample_image(width, height)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
