/// ASCII slug из произвольного названия: строчные буквы и цифры,
/// остальное схлопывается в одиночные дефисы.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_dash = true; // подавляем ведущий дефис
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_slugs() {
        assert_eq!(slugify("Smartphone"), "smartphone");
        assert_eq!(slugify("Gaming  Laptop 2024"), "gaming-laptop-2024");
        assert_eq!(slugify("  -- Hello, World! --  "), "hello-world");
        assert_eq!(slugify(""), "");
    }
}
