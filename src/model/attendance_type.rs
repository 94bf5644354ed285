use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceType {
    pub id: u64,
    pub label: String,
}

impl AttendanceType {
    /// `None` for labels outside the fixed vocabulary.
    pub fn kind(&self) -> Option<PunchKind> {
        PunchKind::from_label(&self.label)
    }

    pub fn is_unique_per_day(&self) -> bool {
        self.kind().is_some_and(PunchKind::is_unique_per_day)
    }
}

/// The fixed punch vocabulary. The serialized form is the stored label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum PunchKind {
    #[strum(serialize = "Entrada")]
    Entrada,
    #[strum(serialize = "Salida")]
    Salida,
    #[strum(serialize = "Inicio Almuerzo")]
    InicioAlmuerzo,
    #[strum(serialize = "Fin Almuerzo")]
    FinAlmuerzo,
    #[strum(serialize = "Entrada por comisión")]
    EntradaComision,
    #[strum(serialize = "Salida por comisión")]
    SalidaComision,
    #[strum(serialize = "Entrada por otros")]
    EntradaOtros,
    #[strum(serialize = "Salida por otros")]
    SalidaOtros,
}

impl PunchKind {
    pub fn from_label(label: &str) -> Option<Self> {
        label.trim().parse().ok()
    }

    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Kinds an employee may register at most once per day.
    pub fn is_unique_per_day(self) -> bool {
        matches!(
            self,
            PunchKind::Entrada | PunchKind::InicioAlmuerzo | PunchKind::FinAlmuerzo | PunchKind::Salida
        )
    }
}
