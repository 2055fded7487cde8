//! The question catalog and the gift partition.
//!
//! A [`GiftCatalog`] is the ordered list of gift categories, each backed by
//! a set of question ids. The shipped configuration ([`GiftCatalog::standard`])
//! partitions the 45 questions into nine gifts of five questions each, but
//! nothing here assumes a partition: a question may feed several gifts, and
//! a malformed catalog is reported by [`GiftCatalog::validate`] instead of
//! being refused.
//!
//! Declaration order matters: it is the tie-break order for every ranking.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Number of questions in the questionnaire. Question ids run `1..=QUESTION_COUNT`.
pub const QUESTION_COUNT: u32 = 45;

/// Highest answer value. Answers run `0..=MAX_ANSWER_VALUE`.
pub const MAX_ANSWER_VALUE: u8 = 3;

/// A gift category and the questions that contribute to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftDefinition {
    /// Short symbol, e.g. `"A"`.
    pub id: String,
    /// Display name, e.g. `"Profecia"`.
    #[serde(default)]
    pub name: String,
    /// Question ids contributing to this gift, in declaration order.
    pub questions: Vec<u32>,
}

impl GiftDefinition {
    pub fn new(id: &str, name: &str, questions: &[u32]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            questions: questions.to_vec(),
        }
    }

    /// The display name, or the id when no name was configured.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Ordered set of gift definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftCatalog {
    gifts: Vec<GiftDefinition>,
}

/// Result of [`GiftCatalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// True when the question ids form exactly `{1..=QUESTION_COUNT}` with
    /// no id listed twice, and every gift id is distinct.
    pub valid: bool,
    /// Number of (gift, question) mappings.
    pub total_mappings: usize,
    /// Number of distinct question ids mapped.
    pub unique_questions: usize,
    /// Question ids in range that no gift covers.
    pub missing: BTreeSet<u32>,
    /// Ids mapped outside `1..=QUESTION_COUNT`.
    pub unexpected: BTreeSet<u32>,
    /// `total_mappings - unique_questions`.
    pub duplicates: usize,
    /// Gift ids declared by more than one gift.
    pub duplicate_ids: BTreeSet<String>,
}

const GIFT_NAMES: [(&str, &str); 9] = [
    ("A", "Profecia"),
    ("B", "Serviço"),
    ("C", "Ensino"),
    ("D", "Exortação"),
    ("E", "Contribuição"),
    ("F", "Liderança"),
    ("G", "Misericórdia"),
    ("H", "Evangelista"),
    ("I", "Pastor"),
];

impl GiftCatalog {
    pub fn new(gifts: Vec<GiftDefinition>) -> Self {
        Self { gifts }
    }

    /// The shipped configuration: gifts A..I, gift number `k` (1-based)
    /// owning questions `k, k+9, k+18, k+27, k+36`.
    pub fn standard() -> Self {
        let stride = GIFT_NAMES.len() as u32;
        let gifts = GIFT_NAMES
            .iter()
            .zip(1u32..)
            .map(|(&(id, name), first)| {
                let questions: Vec<u32> = (0..5).map(|i| first + i * stride).collect();
                GiftDefinition::new(id, name, &questions)
            })
            .collect();
        Self { gifts }
    }

    /// Gifts in declaration order.
    pub fn gifts(&self) -> &[GiftDefinition] {
        &self.gifts
    }

    pub fn len(&self) -> usize {
        self.gifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GiftDefinition> {
        self.gifts.iter().find(|g| g.id == id)
    }

    /// Declaration position of a gift id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.gifts.iter().position(|g| g.id == id)
    }

    /// Display label for a gift id, falling back to the id itself.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(GiftDefinition::label).unwrap_or(id)
    }

    /// Structural self-check: the mapped question ids must be exactly
    /// `{1..=QUESTION_COUNT}`, each listed once, and no two gifts may share
    /// an id.
    pub fn validate(&self) -> ConfigDiagnostic {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut ids: HashSet<&str> = HashSet::new();
        let mut duplicate_ids: BTreeSet<String> = BTreeSet::new();
        let mut total_mappings = 0usize;
        for gift in &self.gifts {
            if !ids.insert(gift.id.as_str()) {
                duplicate_ids.insert(gift.id.clone());
            }
            for &q in &gift.questions {
                total_mappings += 1;
                seen.insert(q);
            }
        }

        let missing: BTreeSet<u32> = (1..=QUESTION_COUNT).filter(|q| !seen.contains(q)).collect();
        let unexpected: BTreeSet<u32> = seen
            .iter()
            .copied()
            .filter(|q| !(1..=QUESTION_COUNT).contains(q))
            .collect();
        let duplicates = total_mappings - seen.len();

        ConfigDiagnostic {
            valid: missing.is_empty()
                && unexpected.is_empty()
                && duplicates == 0
                && duplicate_ids.is_empty(),
            total_mappings,
            unique_questions: seen.len(),
            missing,
            unexpected,
            duplicates,
            duplicate_ids,
        }
    }
}

impl Default for GiftCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text of question `id`, if it exists.
pub fn question_text(id: u32) -> Option<&'static str> {
    QUESTIONS
        .iter()
        .find(|(qid, _)| *qid == id)
        .map(|(_, text)| *text)
}

/// All questions, ordered by id.
pub fn questions() -> impl Iterator<Item = (u32, &'static str)> {
    QUESTIONS.iter().copied()
}

static QUESTIONS: [(u32, &str); QUESTION_COUNT as usize] = [
    (1, "Gosto de apresentar a verdade de Deus numa forma interessante e entusiasta."),
    (2, "Estou sempre pronto para colocar em posição secundária meu conforto pessoal a fim de que as necessidades alheias sejam satisfeitas."),
    (3, "Tenho facilidade para explorar a verdade de um texto dentro do seu contexto."),
    (4, "Procuro incentivar individualmente os que vacilam e tem problemas espirituais."),
    (5, "Administro meu dinheiro, mesmo quando pouco, de modo a separar uma quantia generosa para o trabalho de Deus."),
    (6, "Acho fácil delegar responsabilidades e preparar outras pessoas para realizações no campo espiritual."),
    (7, "Sou muito sensível às necessidades dos outros."),
    (8, "Acho fácil falar de Jesus para não crentes."),
    (9, "Gosto de acompanhar cristãos para ajudá-los no seu crescimento espiritual."),
    (10, "Quando tento persuadir pessoas a respeito de suas reais motivações, faço-o de modo muito convincente."),
    (11, "Consigo levar pessoas a se sentirem à vontade na minha presença."),
    (12, "Sinto grande impulso para descobrir conceitos bíblicos e repassá-los a outros."),
    (13, "Sempre estou interessado e procuro ajudar o crescimento espiritual das pessoas e levá-las a serem ativas na obra de Deus."),
    (14, "Alegro-me em dar recursos materiais, de sorte que a obra do Senhor possa ser promovida."),
    (15, "Sou eficiente em supervisionar as atividades dos outros."),
    (16, "Gosto de visitar pessoas hospitalizadas ou que não podem sair de casa."),
    (17, "Já tive experiências de levar outros à fé em Jesus."),
    (18, "Tenho experiência de levar cristãos a permanecerem firmes na fé devido ao meu acompanhamento."),
    (19, "Posso apresentar a Palavra de Deus a uma congregação de pessoas com clareza a ponto de serem trazidas à luz verdades escondidas."),
    (20, "Sinto-me feliz quando solicitado a dar assistência a outros na obra do Senhor sem necessariamente ser indicado para um posto de liderança."),
    (21, "Sou muito interessado em apresentar conceitos bíblicos de modo bem claro, dando especial atenção a definição de palavras importantes no texto."),
    (22, "Sinto-me feliz por poder tratar as pessoas feridas espiritualmente."),
    (23, "Não tenho nenhum problema em confiar os meus recursos a outros para a obra do ministério."),
    (24, "Posso planejar as ações de outras pessoas, com calma, e dar-lhes os detalhes que as capacitem a trabalhar com eficiência."),
    (25, "Tenho grande interesse pelos que se acham envolvidos em dificuldades."),
    (26, "Considero um grande problema o fato de muitos cristãos não falarem aos outros da sua fé em Jesus."),
    (27, "Preocupo-me com o fato de que muitos cristãos não receberem um acompanhamento na sua vida pessoal e espiritual."),
    (28, "Esforço-me grandemente para obter resultados, sempre que apresento as verdades da Palavra de Deus."),
    (29, "Sinto-me bem quando proporciono um agradável acolhimento aos hóspedes."),
    (30, "Sou diligente em meu estudo da Bíblia e dispenso cuidadosa atenção à necessária pesquisa, não apenas para mostrar sabedoria, mas porque eu gosto."),
    (31, "Julgo poder ajudar os que têm necessidades de aconselhamento sobre problemas pessoais."),
    (32, "Preocupo-me em saber que o trabalho de assistência social está sendo suprido de recursos."),
    (33, "Procuro estar ciente dos recursos disponíveis para a execução das tarefas que tenho que realizar."),
    (34, "Sinto-me feliz quando consigo atingir pessoas geralmente esquecidas pelos outros."),
    (35, "Para mim é fácil perceber quando uma pessoa está aberta a aceitar o evangelho."),
    (36, "É fácil, para mim, acompanhar pessoalmente um grupo de cristãos e me empenhar pela sua unidade."),
    (37, "Verifico que minha pregação leve pessoas a um ponto de decisão definido."),
    (38, "Gosto de aliviar a carga das pessoas que ocupam uma posição-chave, de sorte que possam esforçar-se mais em tarefas a elas concernentes."),
    (39, "Posso explicar bem como a Bíblia mantém sua unidade."),
    (40, "Sou agudamente consciente das coisas que impedem as pessoas em seu desenvolvimento espiritual e anseio por ajudá-las a vencer seus problemas."),
    (41, "Sou cuidadoso com a questão de dinheiro e oro continuamente acerca de sua distribuição adequada na obra do Senhor."),
    (42, "Tenho objetivos bem definidos e consigo levar outros a assumirem meus objetivos."),
    (43, "Posso relacionar-me com outras pessoas emocionalmente e me disponho a ajudá-las quando for necessário."),
    (44, "Estou disposto a frequentar um curso preparatório para o evangelismo."),
    (45, "Estou disposto a assumir a responsabilidade por um grupo de irmãos."),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid_partition() {
        let catalog = GiftCatalog::standard();
        assert_eq!(catalog.len(), 9);
        let diag = catalog.validate();
        assert!(diag.valid, "{:?}", diag);
        assert_eq!(diag.total_mappings, 45);
        assert_eq!(diag.unique_questions, 45);
        assert_eq!(diag.duplicates, 0);
        assert!(diag.missing.is_empty());
        assert!(diag.duplicate_ids.is_empty());
    }

    #[test]
    fn test_standard_catalog_layout() {
        let catalog = GiftCatalog::standard();
        assert_eq!(catalog.gifts()[0].questions, vec![1, 10, 19, 28, 37]);
        assert_eq!(catalog.gifts()[8].questions, vec![9, 18, 27, 36, 45]);
        assert_eq!(catalog.get("E").unwrap().questions, vec![5, 14, 23, 32, 41]);
        assert_eq!(catalog.label("G"), "Misericórdia");
        assert_eq!(catalog.label("Z"), "Z");
        assert_eq!(catalog.position("C"), Some(2));
    }

    #[test]
    fn test_validate_reports_missing_and_duplicates() {
        let catalog = GiftCatalog::new(vec![
            GiftDefinition::new("A", "", &[1, 2, 3]),
            GiftDefinition::new("B", "", &[3, 4, 46]),
        ]);
        let diag = catalog.validate();
        assert!(!diag.valid);
        assert_eq!(diag.duplicates, 1);
        assert_eq!(diag.unexpected, BTreeSet::from([46]));
        assert_eq!(diag.missing.len(), 41);
        assert!(diag.missing.contains(&5));
        assert!(!diag.missing.contains(&4));
    }

    #[test]
    fn test_duplicates_alone_invalidate() {
        let mut gifts = GiftCatalog::standard().gifts().to_vec();
        gifts[1].questions.push(1);
        let diag = GiftCatalog::new(gifts).validate();
        assert!(diag.missing.is_empty());
        assert_eq!(diag.duplicates, 1);
        assert!(!diag.valid);
    }

    #[test]
    fn test_repeated_gift_id_invalidates() {
        let mut gifts = GiftCatalog::standard().gifts().to_vec();
        gifts[1].id = "A".to_string();
        let diag = GiftCatalog::new(gifts).validate();
        assert!(diag.missing.is_empty());
        assert_eq!(diag.duplicates, 0);
        assert_eq!(diag.duplicate_ids, BTreeSet::from(["A".to_string()]));
        assert!(!diag.valid);
    }

    #[test]
    fn test_question_texts_cover_every_id() {
        for id in 1..=QUESTION_COUNT {
            assert!(question_text(id).is_some(), "missing text for {}", id);
        }
        assert!(question_text(0).is_none());
        assert!(question_text(46).is_none());
        assert_eq!(questions().count(), QUESTION_COUNT as usize);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let gift = GiftDefinition::new("X", "", &[1]);
        assert_eq!(gift.label(), "X");
    }
}
