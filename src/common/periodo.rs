use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::common::error::AppError;

/// Intervalo de datas usado pelas visões agregadas. A âncora de calendário é
/// sempre UTC (truncagem à meia-noite UTC), nunca o fuso local do servidor,
/// para o dia do cliente e do servidor nunca divergirem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodo {
    pub inicio: DateTime<Utc>,
    pub fim: DateTime<Utc>,
}

impl Periodo {
    /// Monta o período a partir dos parâmetros `from`/`to` da query string.
    /// Sem parâmetros, o padrão é o mês corrente (primeiro ao último instante,
    /// em UTC). Datas não parseáveis falham cedo com erro de validação.
    pub fn from_params(from: Option<&str>, to: Option<&str>) -> Result<Self, AppError> {
        match (from, to) {
            (Some(from), Some(to)) => {
                let inicio = parse_instante(from)?;
                let fim = parse_instante(to)?;
                Ok(Self { inicio, fim })
            }
            _ => Ok(Self::mes_corrente(Utc::now())),
        }
    }

    /// Primeiro e último instante do mês do instante de referência.
    pub fn mes_corrente(referencia: DateTime<Utc>) -> Self {
        let (ano, mes) = (referencia.year(), referencia.month());
        let primeiro_dia = NaiveDate::from_ymd_opt(ano, mes, 1)
            .expect("dia 1 sempre existe");
        let primeiro_dia_proximo_mes = if mes == 12 {
            NaiveDate::from_ymd_opt(ano + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(ano, mes + 1, 1)
        }
        .expect("dia 1 sempre existe");
        let ultimo_dia = primeiro_dia_proximo_mes - Duration::days(1);

        Self {
            inicio: primeiro_dia.and_time(NaiveTime::MIN).and_utc(),
            fim: ultimo_dia
                .and_hms_milli_opt(23, 59, 59, 999)
                .expect("último instante sempre existe")
                .and_utc(),
        }
    }

    /// Enumeração densa e inclusiva dos dias do período (inclui fins de
    /// semana e dias sem lição). Intervalo invertido produz lista vazia,
    /// sem erro.
    pub fn dias(&self) -> Vec<NaiveDate> {
        let mut dias = Vec::new();
        let mut cursor = self.inicio.date_naive();
        let fim = self.fim.date_naive();

        while cursor <= fim {
            dias.push(cursor);
            cursor += Duration::days(1);
        }

        dias
    }

    /// Rótulo "YYYY-MM" do início do período, usado no cabeçalho do painel.
    pub fn rotulo_mes(&self) -> String {
        format!("{:04}-{:02}", self.inicio.year(), self.inicio.month())
    }
}

/// Aceita instantes RFC 3339 ("2024-03-05T00:00:00Z") e datas simples
/// ("2024-03-05", interpretadas como meia-noite UTC).
pub fn parse_instante(valor: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(instante) = DateTime::parse_from_rfc3339(valor) {
        return Ok(instante.with_timezone(&Utc));
    }
    if let Ok(data) = NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
        return Ok(data.and_time(NaiveTime::MIN).and_utc());
    }
    Err(AppError::DadosInvalidos(format!(
        "Intervalo de data inválido: '{}'",
        valor
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn aceita_rfc3339_e_data_simples() {
        let p = Periodo::from_params(Some("2024-03-01T00:00:00Z"), Some("2024-03-05")).unwrap();
        assert_eq!(p.inicio, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(p.fim, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn data_invalida_falha_cedo() {
        let erro = Periodo::from_params(Some("ontem"), Some("2024-03-05"));
        assert!(matches!(erro, Err(AppError::DadosInvalidos(_))));
    }

    #[test]
    fn sem_parametros_usa_mes_corrente_em_utc() {
        let referencia = Utc.with_ymd_and_hms(2024, 2, 10, 15, 30, 0).unwrap();
        let p = Periodo::mes_corrente(referencia);
        assert_eq!(p.inicio, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        // 2024 é bissexto: fevereiro termina no dia 29.
        assert_eq!(p.fim.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(p.rotulo_mes(), "2024-02");
    }

    #[test]
    fn mes_corrente_em_dezembro_vira_o_ano() {
        let referencia = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        let p = Periodo::mes_corrente(referencia);
        assert_eq!(p.fim.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn dias_enumera_denso_e_inclusivo() {
        let p = Periodo::from_params(Some("2024-03-01"), Some("2024-03-05")).unwrap();
        let dias = p.dias();
        assert_eq!(dias.len(), 5);
        assert_eq!(dias[0], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(dias[4], NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn intervalo_invertido_produz_lista_vazia() {
        let p = Periodo::from_params(Some("2024-03-10"), Some("2024-03-01")).unwrap();
        assert!(p.dias().is_empty());
    }
}
