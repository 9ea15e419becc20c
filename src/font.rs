/// Core-font request, rendered to an XLFD pattern for the display service.
///
/// Field order follows the pattern itself:
/// `-foundry-family-weight-slant-setwidth-addstyle-pixel-point-resx-resy-spacing-avgwidth-registry-encoding`.
/// Every field defaults to a wildcard except the family, weight, slant, and
/// point size, which is expressed in tenths of a point (120 = 12pt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub foundry: String,
    pub family: String,
    pub weight: String,
    pub slant: String,
    pub setwidth: String,
    pub add_style: String,
    pub pixel_size: String,
    pub point_size: u16,
    pub resolution_x: String,
    pub resolution_y: String,
    /// `p` proportional, `m` monospace, `c` character cell, `*` any.
    pub spacing: char,
    pub average_width: String,
    pub charset_registry: String,
    pub charset_encoding: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            foundry: "*".into(),
            family: "helvetica".into(),
            weight: "medium".into(),
            slant: "r".into(),
            setwidth: "*".into(),
            add_style: "*".into(),
            pixel_size: "*".into(),
            point_size: 120,
            resolution_x: "*".into(),
            resolution_y: "*".into(),
            spacing: '*',
            average_width: "*".into(),
            charset_registry: "*".into(),
            charset_encoding: "*".into(),
        }
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, point_size: u16) -> Self {
        Self {
            family: family.into(),
            point_size,
            ..Self::default()
        }
    }

    pub fn to_xlfd(&self) -> String {
        format!(
            "-{}-{}-{}-{}-{}-{}-{}-{}-{}-{}-{}-{}-{}-{}",
            self.foundry,
            self.family,
            self.weight,
            self.slant,
            self.setwidth,
            self.add_style,
            self.pixel_size,
            self.point_size,
            self.resolution_x,
            self.resolution_y,
            self.spacing,
            self.average_width,
            self.charset_registry,
            self.charset_encoding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_is_wildcarded_helvetica() {
        assert_eq!(
            FontSpec::default().to_xlfd(),
            "-*-helvetica-medium-r-*-*-*-120-*-*-*-*-*-*"
        );
    }

    #[test]
    fn family_and_size_slot_into_the_pattern() {
        let spec = FontSpec::new("fixed", 100);
        assert_eq!(spec.to_xlfd(), "-*-fixed-medium-r-*-*-*-100-*-*-*-*-*-*");
    }
}
