//! Content type detection from the first bytes of a body.

use mime::Mime;

/// How many leading bytes a [`Sniffer`] is given.
pub const SNIFF_LEN: usize = 512;

/// Detects a content type from a body prefix of at most [`SNIFF_LEN`] bytes.
pub trait Sniffer: Send + Sync {
    fn sniff(&self, prefix: &[u8]) -> Mime;
}

impl<F> Sniffer for F
where
    F: Fn(&[u8]) -> Mime + Send + Sync,
{
    fn sniff(&self, prefix: &[u8]) -> Mime {
        self(prefix)
    }
}

/// The default detector: markup signatures, then magic numbers, then a text/binary check.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicSniffer;

const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!doctype html",
    b"<html",
    b"<head",
    b"<script",
    b"<iframe",
    b"<h1",
    b"<div",
    b"<font",
    b"<table",
    b"<a",
    b"<style",
    b"<title",
    b"<b",
    b"<body",
    b"<br",
    b"<p",
    b"<!--",
];

impl Sniffer for MagicSniffer {
    fn sniff(&self, prefix: &[u8]) -> Mime {
        let prefix = &prefix[..prefix.len().min(SNIFF_LEN)];
        let trimmed = trim_leading_whitespace(prefix);

        if HTML_SIGNATURES.iter().any(|signature| is_markup_tag(trimmed, signature)) {
            return mime::TEXT_HTML_UTF_8;
        }
        if starts_with_ignore_case(trimmed, b"<?xml") {
            return "text/xml; charset=utf-8".parse().unwrap_or(mime::TEXT_XML);
        }

        if let Some(mime) = infer::get(prefix).and_then(|kind| kind.mime_type().parse::<Mime>().ok()) {
            return mime;
        }

        if prefix.iter().any(|&b| is_binary_byte(b)) {
            mime::APPLICATION_OCTET_STREAM
        } else {
            mime::TEXT_PLAIN_UTF_8
        }
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')).unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], pattern: &[u8]) -> bool {
    data.len() >= pattern.len() && data[..pattern.len()].eq_ignore_ascii_case(pattern)
}

/// A tag signature must be followed by a space or `>` so `<a` does not match `<audio`.
fn is_markup_tag(data: &[u8], signature: &[u8]) -> bool {
    if !starts_with_ignore_case(data, signature) {
        return false;
    }
    if signature == b"<!--" {
        return true;
    }
    matches!(data.get(signature.len()), Some(b' ' | b'>'))
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}
