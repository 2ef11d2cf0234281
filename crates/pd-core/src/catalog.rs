//! Static challenge reference data.
//!
//! Every entry carries its player-count range, a free-text duration range as
//! the host knows it, and the briefing text typed into the room when the
//! challenge is explained. Lookups are read-only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the placeholder entry for rounds played without a challenge.
pub const NO_CHALLENGE: &str = "Nenhuma Prova";

/// Fallback duration for entries whose duration is unknown or variable.
const DEFAULT_DURATION_MINUTES: f64 = 4.0;

/// Broad kind of a challenge, used to diversify suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeCategory {
    /// Decided by dexterity or speed.
    Skill,
    /// Decided by chance.
    Luck,
    /// Decided by what the players know.
    Knowledge,
    /// Decided by player interaction.
    Social,
    /// Not a challenge at all.
    None,
}

impl fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill => write!(f, "skill"),
            Self::Luck => write!(f, "luck"),
            Self::Knowledge => write!(f, "knowledge"),
            Self::Social => write!(f, "social"),
            Self::None => write!(f, "-"),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Challenge {
    /// Unique name.
    pub name: &'static str,
    /// Broad kind.
    pub category: ChallengeCategory,
    /// Second kind for blended entries, e.g. a social game decided by luck.
    pub secondary: Option<ChallengeCategory>,
    /// Fewest players the challenge works with.
    pub min_players: u32,
    /// Most players, or `None` when unbounded.
    pub max_players: Option<u32>,
    /// Duration as the host writes it, e.g. `"2 - 3 min"`.
    pub duration: &'static str,
    /// Host notes.
    pub notes: &'static str,
    /// Text typed into the room to explain the rules.
    pub briefing: Option<&'static str>,
}

impl Challenge {
    /// Whether either kind of the entry is `category`.
    pub fn is(&self, category: ChallengeCategory) -> bool {
        self.category == category || self.secondary == Some(category)
    }

    /// Kind label for listings, e.g. `"social / luck"`.
    pub fn kind_label(&self) -> String {
        match self.secondary {
            Some(second) => format!("{} / {second}", self.category),
            None => self.category.to_string(),
        }
    }

    /// Whether `players` falls within the entry's player range.
    pub fn fits(&self, players: u32) -> bool {
        players >= self.min_players && self.max_players.is_none_or(|max| players <= max)
    }

    /// Representative duration in minutes.
    pub fn typical_duration_minutes(&self) -> f64 {
        parse_duration(self.duration)
    }

    /// Whether this is the "no challenge" placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.name == NO_CHALLENGE
    }

    /// Human-readable player range, e.g. `"5-11"` or `"8+"`.
    pub fn player_range(&self) -> String {
        match self.max_players {
            Some(max) => format!("{}-{max}", self.min_players),
            None => format!("{}+", self.min_players),
        }
    }
}

/// Reduce a free-text duration range to one average value in minutes.
///
/// `"2 - 3 min"` gives 2.5, `"1,5 min"` gives 1.5, anything mentioning
/// `30s` gives 0.5, and blank, `-`, or variable durations fall back to 4.
pub fn parse_duration(text: &str) -> f64 {
    let clean = text.trim().replace(',', ".").to_lowercase();
    if clean.is_empty() || clean == "-" || clean == "variável" || clean == "variavel" {
        return DEFAULT_DURATION_MINUTES;
    }
    if clean.contains("30s") {
        return 0.5;
    }

    let numbers: Vec<f64> = clean
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match numbers.as_slice() {
        [] => 5.0,
        [low, high] => (low + high) / 2.0,
        [first, ..] => *first,
    }
}

/// The full catalog, ordered by name.
pub fn catalog() -> &'static [Challenge] {
    CATALOG
}

/// Find an entry by name (case-insensitive).
pub fn find(name: &str) -> Option<&'static Challenge> {
    let name = name.trim().to_lowercase();
    CATALOG.iter().find(|c| c.name.to_lowercase() == name)
}

const fn entry(
    name: &'static str,
    category: ChallengeCategory,
    min_players: u32,
    max_players: Option<u32>,
    duration: &'static str,
    notes: &'static str,
    briefing: Option<&'static str>,
) -> Challenge {
    Challenge {
        name,
        category,
        secondary: None,
        min_players,
        max_players,
        duration,
        notes,
        briefing,
    }
}

const fn also(challenge: Challenge, secondary: ChallengeCategory) -> Challenge {
    Challenge {
        secondary: Some(secondary),
        ..challenge
    }
}

use ChallengeCategory::{Knowledge, Luck, Skill, Social};

const CATALOG: &[Challenge] = &[
    also(entry("A Escolha", Social, 8, Some(18), "2 - 3 min", "", Some("Chegou a hora de A Escolha. Se for sorteado, você deve eliminar um brother secretamente clicando no piso verde dele ou nele. Quem sobrar, vence!")), Luck),
    entry("Balão", Luck, 8, None, "1,5 min", "", Some("Prova do Balão! Escolham uma cor e pisem nela. Vou estourar um balão: se sair a sua cor, você perde. O último a sobrar vence!")),
    entry("Banzai", Luck, 0, None, "30s - 1 min", "", Some("Hora de testar a sorte no Banzai! Entrem nos teleportes. Quem conseguir sentar na cadeira do outro lado vence a rodada!")),
    entry("Batata Quente", Skill, 7, None, "Variável", "Elimina 1 a cada 30s", Some("Batata Quente! Uma pessoa começa com o fogo. Passem para outro clicando nele! Não segurem por mais de 5s e não terminem a rodada com o fogo!")),
    entry("Cabo de Guerra", Skill, 6, None, "30s", "Por dupla ou indivíduo", Some("Cabo de Guerra! Pisem repetidamente no piso anel para puxar o objeto para o seu lado. Após 30s, quem tiver o objeto do seu lado vence!")),
    entry("Caixas", Skill, 5, Some(11), "30s", "", Some("Empurrem as Caixas! O objetivo é levar a caixa até o piso anel. Quem encaixar primeiro ganha (o wired desempata se for junto)!")),
    entry("Céu ou Inferno", Luck, 6, None, "1 - 2 min", "", Some("Céu ou Inferno? A sorte define seu destino. Sorteados para o Céu continuam, Inferno perde. Se todos perderem, eu refaço!")),
    entry("Chão é Lava", Luck, 8, None, "3 - 5 min", "", Some("O Chão é Lava! O piso vai sumir aleatoriamente. Não fiquem parados onde não tem chão! No final, corram para o piso verde para vencer.")),
    entry("Cliques", Skill, 5, Some(7), "1,5 min", "", Some("Atenção na Prova dos Clicks! Vocês andarão para frente automaticamente. Cliquem rápido para voltar e evitem pisar no piso anel a todo custo!")),
    entry("Cruzamento", Skill, 6, None, "3 min", "Bom p/ muita gente", Some("Atenção ao Cruzamento! Vocês têm exatos 30 segundos para atravessar a arena e chegar ao lado oposto. Quem não conseguir, está fora!")),
    entry("Danger", Skill, 0, None, "3,5 min", "", Some("Cuidado, é Danger! Essas esferas não perseguem, mas mudam de direção ao bater. Quem for tocado por elas está eliminado!")),
    entry("Defenda o seu pufe", Luck, 6, Some(10), "3 min", "", Some("Defenda o seu Pufe! Fiquem longe do piso anel. As cadeiras andam sozinhas para frente. Dica: você pode roubar a cadeira do colega para se salvar!")),
    also(entry("Descubra a Senha", Knowledge, 8, None, "2 - 3 min", "", Some("Vamos jogar Descubra a Senha! Tente adivinhar a resposta correta. O primeiro a acertar e sentar na cadeira vence!")), Luck),
    entry("Divertidamente", Skill, 9, None, "5 min", "Bom p/ muita gente", Some("Bem-vindos ao Divertidamente! É simples: o primeiro que pisar no piso anel vence a rodada!")),
    entry("Dodge Ball", Skill, 4, Some(8), "3 - 4 min", "", Some("Hora do Dodge Ball! Dividam-se em dois times. Se o seu número for sorteado, corra para o centro! Quem sentar primeiro marca ponto para a equipe.")),
    entry("Elefante Colorido", Luck, 0, Some(4), "4 - 5 min", "", Some("O jogo é individual. Abra todas as portas o mais rápido possível. O melhor tempo vence!")),
    entry("Elefante Colorido (Esferas)", Skill, 7, None, "3 - 4 min", "Bom p/ muita gente", Some("Fujam das esferas (2 a cada 30s) e corram para a cor sorteada. Quem não estiver na cor, perde!")),
    entry("Fuja", Skill, 0, None, "3 min", "Bom p/ muita gente", Some("Bem-vindos ao Fuja! O objetivo é simples: desviem das esferas que nascem no centro. A cada 30 segundos, 3 novas esferas entram em jogo. Sobrevivam!")),
    entry("Fuja das Cores", Skill, 5, Some(6), "5 min", "", Some("Fuja das Cores! Vejam a cor do piso no meio e puxem a alavanca igual. Isso zera o tempo e adiciona uma esfera. Quem sobreviver mais tempo ganha!")),
    entry("Fuja em Duplas", Skill, 8, Some(8), "4 - 5 min", "Apenas 8 pessoas", Some("Fuja em Duplas! O objetivo é puxar as alavancas dos adversários. Quem acionar todas ganha. Atenção: as portas têm anti-aus de 10s!")),
    entry("Fujamento", Skill, 6, None, "4 min", "Bom p/ muita gente", Some("Preparem-se para o Fujamento! O desafio é atravessar para o lado oposto em 50 segundos, mas desviando dos obstáculos. Boa sorte!")),
    entry("Fujoller", Skill, 5, Some(14), "1,5 min", "", Some("Bem-vindos ao Fujoller! Sobrevivam nos rollers enquanto esferas surgem nas pontas a cada 30s. Cuidado: os mármores atrás dos rollers são fatais!")),
    entry("Ilhados", Luck, 5, Some(8), "2,5 - 3,5 min", "", Some("Vocês estão Ilhados! Sortearei alguém para andar X pisos. Cuidado: quem pisar fora do mármore perde")),
    entry("Ir até cor", Luck, 10, None, "2 - 3 min", "", Some("Atenção: Ir até a Cor! Vou sortear uma cor e vocês têm poucos segundos para subir nela. Quem não estiver na cor certa, perde!")),
    also(entry("Leilão", Skill, 7, Some(11), "2 - 3 min", "", Some("Vocês são ladrões no banco! A cada rodada, terão 15s para escolher quantas barras de ouro roubar. Quem pegar MAIS barras na rodada fica pesado e a polícia pega (perde). Se empatar, o wired sorteia quem sai. Quem não for pego, acumula as barras no placar. No final, vence quem tiver mais ouro!")), Luck),
    entry("Massacre", Skill, 0, None, "2,5 min", "Bom p/ muita gente", Some("Hora do Massacre! Fujam das esferas que surgem no centro. A arena vai encher rápido: mais 2 esferas a cada 30 segundos!")),
    entry(NO_CHALLENGE, ChallengeCategory::None, 0, None, "-", "Apenas votação", None),
    entry("Nervosos", Skill, 8, None, "2,5 - 3,5 min", "", Some("Nervosos! O meio muda de cor. Só andem no VERDE. Se sentar no meio, elimina um. Quem andar fora do verde congela!")),
    entry("Pacman", ChallengeCategory::None, 6, Some(8), "4 - 5 min", "Sempre nº par", Some("Hora do Pacman! Corram pela arena e coletem os pisos. Quem tiver coletado mais pisos que o adversário no final vence!")),
    entry("Pegue a Lebre", Skill, 7, None, "Variável", "Elimina 1 a cada 30s", None),
    entry("Pegue o Drink", Skill, 6, None, "4 min", "Bom p/ muita gente", Some("Pegue o Drink! Corram até o outro lado, peguem a bebida e voltem para o início em menos de 50 segundos")),
    entry("Queimada", Skill, 8, None, "3 - 4 min", "", None),
    entry("Resta 1", Skill, 4, None, "2,5 - 3,5 min", "", Some("O clássico Resta 1! Sobrevivam na arena sem pisar no fogo. O último a ficar de pé vence a prova.")),
    entry("Sobrevivência", Skill, 7, None, "1 min", "", Some("Prova de Sobrevivência! Aguentem 1 minuto. Pisem apenas quando estiver VERDE (Vermelho congela 1s). Ao final do tempo, sentem para vencer!")),
    entry("Subir nas Portas", Skill, 8, Some(16), "1 - 2 min", "Sempre nº par", Some("Subir nas Portas! Formem grupos. Abrirei uma porta aleatória na frente de cada grupo. Quem subir continua, quem ficar no chão dá tchau!")),
    entry("Tiro ao Alvo", Luck, 8, None, "1 - 2 min", "", Some("Tiro ao Alvo! O objetivo é chegar o mais próximo possível do piso verde. Quem ficar longe do alvo será eliminado!")),
    entry("Velocidade é Tudo", Skill, 8, None, "3,5 - 4,5 min", "", Some("Lembrem-se: Velocidade é Tudo! Quem sentar no Pufe Vermelho elimina 2 brothers. Quem pegar o Verde ganha imunidade na rodada!")),
    entry("Verdadeiro ou Falso", Knowledge, 10, None, "5 - 6 min", "", Some("Verdadeiro ou Falso? Vou fazer uma afirmação. Corram para o lado que acham ser a resposta correta. Quem errar, perde!")),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn parse_range_averages() {
        assert_eq!(parse_duration("2 - 3 min"), 2.5);
        assert_eq!(parse_duration("2,5 - 3,5 min"), 3.0);
    }

    #[test]
    fn parse_single_value() {
        assert_eq!(parse_duration("1,5 min"), 1.5);
        assert_eq!(parse_duration("5 min"), 5.0);
    }

    #[test]
    fn parse_seconds() {
        assert_eq!(parse_duration("30s"), 0.5);
        assert_eq!(parse_duration("30s - 1 min"), 0.5);
    }

    #[test]
    fn parse_unknown_defaults() {
        assert_eq!(parse_duration("-"), 4.0);
        assert_eq!(parse_duration("Variável"), 4.0);
        assert_eq!(parse_duration(""), 4.0);
        assert_eq!(parse_duration("quick"), 5.0);
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = catalog().iter().map(|c| c.name.to_lowercase()).collect();
        assert_eq!(names.len(), catalog().len());
    }

    #[test]
    fn catalog_has_one_placeholder() {
        assert_eq!(catalog().iter().filter(|c| c.is_placeholder()).count(), 1);
        assert!(find("nenhuma prova").unwrap().is_placeholder());
    }

    #[test]
    fn find_case_insensitive() {
        let c = find("  banzai ").unwrap();
        assert_eq!(c.name, "Banzai");
        assert_eq!(c.category, ChallengeCategory::Luck);
        assert!(find("Unknown Game").is_none());
    }

    #[test]
    fn fits_player_range() {
        let caixas = find("Caixas").unwrap();
        assert!(!caixas.fits(4));
        assert!(caixas.fits(5));
        assert!(caixas.fits(11));
        assert!(!caixas.fits(12));

        let fuja = find("Fuja").unwrap();
        assert!(fuja.fits(0));
        assert!(fuja.fits(500));
    }

    #[test]
    fn player_range_labels() {
        assert_eq!(find("Caixas").unwrap().player_range(), "5-11");
        assert_eq!(find("Balão").unwrap().player_range(), "8+");
    }

    #[test]
    fn blended_entries_carry_both_kinds() {
        let leilao = find("Leilão").unwrap();
        assert_eq!(leilao.category, ChallengeCategory::Skill);
        assert!(leilao.is(ChallengeCategory::Luck));
        assert_eq!(leilao.kind_label(), "skill / luck");

        let escolha = find("A Escolha").unwrap();
        assert!(escolha.is(ChallengeCategory::Social));
        assert!(escolha.is(ChallengeCategory::Luck));
        assert!(!escolha.is(ChallengeCategory::Skill));

        assert!(find("Descubra a Senha").unwrap().is(ChallengeCategory::Luck));
        assert_eq!(find("Caixas").unwrap().kind_label(), "skill");
    }

    #[test]
    fn ranges_are_consistent() {
        for c in catalog() {
            if let Some(max) = c.max_players {
                assert!(c.min_players <= max, "{} has min > max", c.name);
            }
        }
    }
}
