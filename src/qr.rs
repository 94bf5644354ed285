use qrcode::QrCode;
use qrcode::render::svg;
use qrcode::types::QrError;

/// Renders `url` as a standalone SVG QR code.
pub fn kiosk_qr_svg(url: &str) -> Result<String, QrError> {
    let code = QrCode::new(url.as_bytes())?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(320, 320)
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_an_svg_document() {
        let svg = kiosk_qr_svg("http://127.0.0.1:8000/qr/checkin").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn different_urls_give_different_codes() {
        let a = kiosk_qr_svg("https://a.example.com/").unwrap();
        let b = kiosk_qr_svg("https://b.example.com/").unwrap();
        assert_ne!(a, b);
    }
}
