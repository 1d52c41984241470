//! The syntactic attribute carried by every token and tree node.
//!
//! A node's attribute is mutable: reduction promotes the same physical node
//! in place (an `Identifier` becomes a `DefiningIdentifier`, a `BoldTag`
//! becomes an `Indicant` or an `Operator`). The enum is exhaustive on purpose
//! so that a missing reduction rule is a compile error, not a silent integer
//! mismatch.

use serde::Serialize;

/// Every terminal and non-terminal tag of the grammar.
// `strum::AsRefStr` rather than `strum::Display`: the latter rejects the
// brace spellings because it parses them as format strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Attribute {
    // Enclosure symbols.
    #[strum(serialize = "BEGIN")]
    BeginSymbol,
    #[strum(serialize = "END")]
    EndSymbol,
    #[strum(serialize = "(")]
    OpenSymbol,
    #[strum(serialize = ")")]
    CloseSymbol,
    #[strum(serialize = "[")]
    SubSymbol,
    #[strum(serialize = "]")]
    BusSymbol,
    #[strum(serialize = "{")]
    AccoSymbol,
    #[strum(serialize = "}")]
    OccaSymbol,
    #[strum(serialize = "$")]
    FormatDelimiterSymbol,
    #[strum(serialize = "format (")]
    FormatOpenSymbol,
    #[strum(serialize = "format )")]
    FormatCloseSymbol,

    // Choice-clause symbols.
    #[strum(serialize = "IF")]
    IfSymbol,
    #[strum(serialize = "THEN")]
    ThenSymbol,
    #[strum(serialize = "ELIF")]
    ElifSymbol,
    #[strum(serialize = "ELSE")]
    ElseSymbol,
    #[strum(serialize = "FI")]
    FiSymbol,
    #[strum(serialize = "CASE")]
    CaseSymbol,
    #[strum(serialize = "IN")]
    InSymbol,
    #[strum(serialize = "OUSE")]
    OuseSymbol,
    #[strum(serialize = "OUT")]
    OutSymbol,
    #[strum(serialize = "ESAC")]
    EsacSymbol,

    // Loop symbols.
    #[strum(serialize = "FOR")]
    ForSymbol,
    #[strum(serialize = "FROM")]
    FromSymbol,
    #[strum(serialize = "BY")]
    BySymbol,
    #[strum(serialize = "TO")]
    ToSymbol,
    #[strum(serialize = "DOWNTO")]
    DowntoSymbol,
    #[strum(serialize = "WHILE")]
    WhileSymbol,
    #[strum(serialize = "DO")]
    DoSymbol,
    #[strum(serialize = "OD")]
    OdSymbol,
    #[strum(serialize = "UNTIL")]
    UntilSymbol,

    // Declaration symbols.
    #[strum(serialize = "MODE")]
    ModeSymbol,
    #[strum(serialize = "PRIO")]
    PrioSymbol,
    #[strum(serialize = "OP")]
    OpSymbol,
    #[strum(serialize = "PROC")]
    ProcSymbol,
    #[strum(serialize = "HEAP")]
    HeapSymbol,
    #[strum(serialize = "LOC")]
    LocSymbol,
    #[strum(serialize = "NEW")]
    NewSymbol,
    #[strum(serialize = "REF")]
    RefSymbol,
    #[strum(serialize = "FLEX")]
    FlexSymbol,
    #[strum(serialize = "STRUCT")]
    StructSymbol,
    #[strum(serialize = "UNION")]
    UnionSymbol,
    #[strum(serialize = "LONG")]
    LongSymbol,
    #[strum(serialize = "SHORT")]
    ShortSymbol,

    // Standard mode indicants.
    #[strum(serialize = "INT")]
    IntSymbol,
    #[strum(serialize = "REAL")]
    RealSymbol,
    #[strum(serialize = "BOOL")]
    BoolSymbol,
    #[strum(serialize = "CHAR")]
    CharSymbol,
    #[strum(serialize = "BITS")]
    BitsSymbol,
    #[strum(serialize = "BYTES")]
    BytesSymbol,
    #[strum(serialize = "STRING")]
    StringSymbol,
    #[strum(serialize = "COMPL")]
    ComplSymbol,
    #[strum(serialize = "SEMA")]
    SemaSymbol,
    #[strum(serialize = "FILE")]
    FileSymbol,
    #[strum(serialize = "CHANNEL")]
    ChannelSymbol,
    #[strum(serialize = "FORMAT")]
    FormatSymbol,
    #[strum(serialize = "VOID")]
    VoidSymbol,

    // Torrix extensions (matrix functions).
    #[strum(serialize = "DIAG")]
    DiagonalSymbol,
    #[strum(serialize = "TRNSP")]
    TransposeSymbol,
    #[strum(serialize = "ROW")]
    RowSymbol,
    #[strum(serialize = "COL")]
    ColumnSymbol,

    // Unit symbols.
    #[strum(serialize = "GOTO")]
    GotoSymbol,
    #[strum(serialize = "GO")]
    GoSymbol,
    #[strum(serialize = "SKIP")]
    SkipSymbol,
    #[strum(serialize = "NIL")]
    NilSymbol,
    #[strum(serialize = "TRUE")]
    TrueSymbol,
    #[strum(serialize = "FALSE")]
    FalseSymbol,
    #[strum(serialize = "EMPTY")]
    EmptySymbol,
    #[strum(serialize = "CODE")]
    CodeSymbol,
    #[strum(serialize = "EDOC")]
    EdocSymbol,
    #[strum(serialize = "PAR")]
    ParSymbol,
    #[strum(serialize = "OF")]
    OfSymbol,
    #[strum(serialize = "@")]
    AtSymbol,
    #[strum(serialize = "IS")]
    IsSymbol,
    #[strum(serialize = "ISNT")]
    IsntSymbol,
    #[strum(serialize = "ANDF")]
    AndfSymbol,
    #[strum(serialize = "ORF")]
    OrfSymbol,
    #[strum(serialize = "EXIT")]
    ExitSymbol,

    // Punctuation.
    #[strum(serialize = ";")]
    GoOnSymbol,
    #[strum(serialize = ",")]
    CommaSymbol,
    #[strum(serialize = ".")]
    PointSymbol,
    #[strum(serialize = ":")]
    ColonSymbol,
    #[strum(serialize = ":=")]
    AssignSymbol,
    #[strum(serialize = "=")]
    EqualsSymbol,

    // Lexical classes.
    #[strum(serialize = "identifier")]
    Identifier,
    #[strum(serialize = "bold word")]
    BoldTag,
    #[strum(serialize = "operator")]
    Operator,
    #[strum(serialize = "integral denotation")]
    IntDenotation,
    #[strum(serialize = "real denotation")]
    RealDenotation,
    #[strum(serialize = "bits denotation")]
    BitsDenotation,
    #[strum(serialize = "string denotation")]
    RowCharDenotation,

    // Defining occurrences, established by the tag resolver.
    #[strum(serialize = "defining identifier")]
    DefiningIdentifier,
    #[strum(serialize = "defining indicant")]
    DefiningIndicant,
    #[strum(serialize = "defining operator")]
    DefiningOperator,
    #[strum(serialize = "indicant")]
    Indicant,
    #[strum(serialize = "field selector")]
    FieldIdentifier,
    #[strum(serialize = "label")]
    Label,

    // Format items (single characters inside $ ... $).
    #[strum(serialize = "format item a")]
    FormatItemA,
    #[strum(serialize = "format item b")]
    FormatItemB,
    #[strum(serialize = "format item c")]
    FormatItemC,
    #[strum(serialize = "format item d")]
    FormatItemD,
    #[strum(serialize = "format item e")]
    FormatItemE,
    #[strum(serialize = "format item f")]
    FormatItemF,
    #[strum(serialize = "format item g")]
    FormatItemG,
    #[strum(serialize = "format item h")]
    FormatItemH,
    #[strum(serialize = "format item i")]
    FormatItemI,
    #[strum(serialize = "format item j")]
    FormatItemJ,
    #[strum(serialize = "format item k")]
    FormatItemK,
    #[strum(serialize = "format item l")]
    FormatItemL,
    #[strum(serialize = "format item m")]
    FormatItemM,
    #[strum(serialize = "format item n")]
    FormatItemN,
    #[strum(serialize = "format item o")]
    FormatItemO,
    #[strum(serialize = "format item p")]
    FormatItemP,
    #[strum(serialize = "format item q")]
    FormatItemQ,
    #[strum(serialize = "format item r")]
    FormatItemR,
    #[strum(serialize = "format item s")]
    FormatItemS,
    #[strum(serialize = "format item t")]
    FormatItemT,
    #[strum(serialize = "format item u")]
    FormatItemU,
    #[strum(serialize = "format item v")]
    FormatItemV,
    #[strum(serialize = "format item w")]
    FormatItemW,
    #[strum(serialize = "format item x")]
    FormatItemX,
    #[strum(serialize = "format item y")]
    FormatItemY,
    #[strum(serialize = "format item z")]
    FormatItemZ,
    #[strum(serialize = "format item +")]
    FormatItemPlus,
    #[strum(serialize = "format item -")]
    FormatItemMinus,
    #[strum(serialize = "format item .")]
    FormatItemPoint,
    #[strum(serialize = "format item %")]
    FormatItemPercent,
    #[strum(serialize = "format item \\")]
    FormatItemEscape,
    #[strum(serialize = "format item /")]
    FormatItemSolidus,

    // Program structure.
    #[strum(serialize = "particular program")]
    ParticularProgram,
    #[strum(serialize = "enclosed clause")]
    EnclosedClause,
    #[strum(serialize = "closed clause")]
    ClosedClause,
    #[strum(serialize = "collateral clause")]
    CollateralClause,
    #[strum(serialize = "parallel clause")]
    ParallelClause,
    #[strum(serialize = "conditional clause")]
    ConditionalClause,
    #[strum(serialize = "case clause")]
    CaseClause,
    #[strum(serialize = "conformity clause")]
    ConformityClause,
    #[strum(serialize = "loop clause")]
    LoopClause,
    #[strum(serialize = "code clause")]
    CodeClause,

    // Clause parts built by the top-down structurer.
    #[strum(serialize = "if part")]
    IfPart,
    #[strum(serialize = "then part")]
    ThenPart,
    #[strum(serialize = "elif part")]
    ElifPart,
    #[strum(serialize = "else part")]
    ElsePart,
    #[strum(serialize = "case part")]
    CasePart,
    #[strum(serialize = "in part")]
    InPart,
    #[strum(serialize = "ouse part")]
    OusePart,
    #[strum(serialize = "out part")]
    OutPart,
    #[strum(serialize = "for part")]
    ForPart,
    #[strum(serialize = "from part")]
    FromPart,
    #[strum(serialize = "by part")]
    ByPart,
    #[strum(serialize = "to part")]
    ToPart,
    #[strum(serialize = "while part")]
    WhilePart,
    #[strum(serialize = "do part")]
    DoPart,
    #[strum(serialize = "until part")]
    UntilPart,

    // Series.
    #[strum(serialize = "serial clause")]
    SerialClause,
    #[strum(serialize = "enquiry clause")]
    EnquiryClause,
    #[strum(serialize = "initialiser series")]
    InitialiserSeries,
    #[strum(serialize = "labeled unit")]
    LabeledUnit,
    #[strum(serialize = "unit list")]
    UnitList,
    #[strum(serialize = "specifier")]
    Specifier,
    #[strum(serialize = "specified unit")]
    SpecifiedUnit,
    #[strum(serialize = "specified unit list")]
    SpecifiedUnitList,

    // Declarers.
    #[strum(serialize = "declarer")]
    Declarer,
    #[strum(serialize = "longety")]
    Longety,
    #[strum(serialize = "shortety")]
    Shortety,
    #[strum(serialize = "structure pack")]
    StructurePack,
    #[strum(serialize = "union pack")]
    UnionPack,
    #[strum(serialize = "formal declarers")]
    FormalDeclarers,
    #[strum(serialize = "parameter pack")]
    ParameterPack,
    #[strum(serialize = "parameter list")]
    ParameterList,
    #[strum(serialize = "parameter")]
    Parameter,
    #[strum(serialize = "bounds")]
    Bounds,
    #[strum(serialize = "formal bounds")]
    FormalBounds,
    #[strum(serialize = "bounds list")]
    BoundsList,
    #[strum(serialize = "bound")]
    Bound,
    #[strum(serialize = "operator plan")]
    OperatorPlan,

    // Declarations.
    #[strum(serialize = "mode declaration")]
    ModeDeclaration,
    #[strum(serialize = "priority declaration")]
    PriorityDeclaration,
    #[strum(serialize = "operator declaration")]
    OperatorDeclaration,
    #[strum(serialize = "brief operator declaration")]
    BriefOperatorDeclaration,
    #[strum(serialize = "identity declaration")]
    IdentityDeclaration,
    #[strum(serialize = "variable declaration")]
    VariableDeclaration,
    #[strum(serialize = "procedure declaration")]
    ProcedureDeclaration,
    #[strum(serialize = "procedure variable declaration")]
    ProcedureVariableDeclaration,
    #[strum(serialize = "declaration list")]
    DeclarationList,
    #[strum(serialize = "qualifier")]
    Qualifier,

    // Units, by rank.
    #[strum(serialize = "unit")]
    Unit,
    #[strum(serialize = "tertiary")]
    Tertiary,
    #[strum(serialize = "secondary")]
    Secondary,
    #[strum(serialize = "primary")]
    Primary,
    #[strum(serialize = "denotation")]
    Denotation,
    #[strum(serialize = "cast")]
    Cast,
    #[strum(serialize = "call")]
    Call,
    #[strum(serialize = "slice")]
    Slice,
    #[strum(serialize = "specification")]
    Specification,
    #[strum(serialize = "selection")]
    Selection,
    #[strum(serialize = "generator")]
    Generator,
    #[strum(serialize = "NIL")]
    Nihil,
    #[strum(serialize = "jump")]
    Jump,
    #[strum(serialize = "formula")]
    Formula,
    #[strum(serialize = "monadic formula")]
    MonadicFormula,
    #[strum(serialize = "assignation")]
    Assignation,
    #[strum(serialize = "identity relation")]
    IdentityRelation,
    #[strum(serialize = "and function")]
    AndFunction,
    #[strum(serialize = "or function")]
    OrFunction,
    #[strum(serialize = "routine text")]
    RoutineText,
    #[strum(serialize = "diagonal function")]
    DiagonalFunction,
    #[strum(serialize = "transpose function")]
    TransposeFunction,
    #[strum(serialize = "row function")]
    RowFunction,
    #[strum(serialize = "column function")]
    ColumnFunction,
    #[strum(serialize = "generic argument")]
    GenericArgument,
    #[strum(serialize = "generic argument list")]
    GenericArgumentList,
    #[strum(serialize = "trimmer")]
    Trimmer,

    // Format text grammar.
    #[strum(serialize = "format text")]
    FormatText,
    #[strum(serialize = "picture list")]
    PictureList,
    #[strum(serialize = "picture")]
    Picture,
    #[strum(serialize = "insertion")]
    Insertion,
    #[strum(serialize = "replicator")]
    Replicator,
    #[strum(serialize = "dynamic replicator")]
    DynamicReplicator,
    #[strum(serialize = "collection")]
    Collection,
    #[strum(serialize = "sign mould")]
    SignMould,
    #[strum(serialize = "integral mould")]
    IntegralMould,
    #[strum(serialize = "integral pattern")]
    IntegralPattern,
    #[strum(serialize = "real pattern")]
    RealPattern,
    #[strum(serialize = "complex pattern")]
    ComplexPattern,
    #[strum(serialize = "bits pattern")]
    BitsPattern,
    #[strum(serialize = "boolean pattern")]
    BooleanPattern,
    #[strum(serialize = "choice pattern")]
    ChoicePattern,
    #[strum(serialize = "string pattern")]
    StringPattern,
    #[strum(serialize = "general pattern")]
    GeneralPattern,
    #[strum(serialize = "format pattern")]
    FormatPattern,
}

impl Attribute {
    /// The closing delimiter matching an opening one, for the bracket checker
    /// and the top-down structurer.
    pub fn matching_closer(self) -> Option<Attribute> {
        use Attribute::*;

        match self {
            BeginSymbol => Some(EndSymbol),
            OpenSymbol => Some(CloseSymbol),
            SubSymbol => Some(BusSymbol),
            AccoSymbol => Some(OccaSymbol),
            IfSymbol => Some(FiSymbol),
            CaseSymbol => Some(EsacSymbol),
            DoSymbol => Some(OdSymbol),
            FormatOpenSymbol => Some(FormatCloseSymbol),
            _ => None,
        }
    }

    /// Whether this attribute is one of the paired closers.
    pub fn is_closer(self) -> bool {
        use Attribute::*;

        matches!(
            self,
            EndSymbol | CloseSymbol | BusSymbol | OccaSymbol | FiSymbol | EsacSymbol | OdSymbol
                | FormatCloseSymbol
        )
    }

    /// Standard mode indicants that may begin a declarer.
    pub fn is_standard_mode(self) -> bool {
        use Attribute::*;

        matches!(
            self,
            IntSymbol
                | RealSymbol
                | BoolSymbol
                | CharSymbol
                | BitsSymbol
                | BytesSymbol
                | StringSymbol
                | ComplSymbol
                | SemaSymbol
                | FileSymbol
                | ChannelSymbol
                | FormatSymbol
                | VoidSymbol
        )
    }

    /// Categories that may stand where a unit is expected once reduced.
    pub fn is_unit(self) -> bool {
        use Attribute::*;

        matches!(
            self,
            Unit | Tertiary
                | Secondary
                | Primary
                | Assignation
                | IdentityRelation
                | AndFunction
                | OrFunction
                | RoutineText
                | Jump
                | SkipSymbol
                | Formula
                | MonadicFormula
                | Denotation
                | Cast
                | Call
                | Slice
                | Selection
                | Generator
                | Nihil
                | DiagonalFunction
                | TransposeFunction
                | RowFunction
                | ColumnFunction
                | EnclosedClause
                | ClosedClause
                | CollateralClause
                | ParallelClause
                | ConditionalClause
                | CaseClause
                | ConformityClause
                | LoopClause
                | CodeClause
                | FormatText
        )
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self.as_ref(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_symbols_display_as_single_braces() {
        assert_eq!(Attribute::AccoSymbol.to_string(), "{");
        assert_eq!(Attribute::OccaSymbol.to_string(), "}");
    }
}
